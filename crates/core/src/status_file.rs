//! Per-project job id record (`.render_job_id.yml`).
//!
//! A two-key YAML mapping holding the id of the most recent frame job and
//! video job. Recording one kind keeps the other kind's id.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::scheduler::JobKind;

/// File name of the status file inside a project directory.
pub const STATUS_FILE_NAME: &str = ".render_job_id.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFile {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub frame: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub video: Option<String>,
}

impl StatusFile {
    pub fn job_id(&self, kind: JobKind) -> Option<&str> {
        match kind {
            JobKind::Frame => self.frame.as_deref(),
            JobKind::Video => self.video.as_deref(),
        }
    }

    pub fn set(&mut self, kind: JobKind, job_id: impl Into<String>) {
        let slot = match kind {
            JobKind::Frame => &mut self.frame,
            JobKind::Video => &mut self.video,
        };
        *slot = Some(job_id.into());
    }

    /// Read the status file in `project_dir`.
    ///
    /// An empty file reads as no recorded jobs.
    pub fn load(project_dir: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(project_dir.join(STATUS_FILE_NAME))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|e| {
            CoreError::Internal(format!(
                "Malformed {STATUS_FILE_NAME} in {}: {e}",
                project_dir.display()
            ))
        })
    }

    /// Read the status file, creating an empty one if it does not exist.
    pub fn load_or_create(project_dir: &Path) -> Result<Self, CoreError> {
        let path = project_dir.join(STATUS_FILE_NAME);
        if !path.exists() {
            Self::default().save(project_dir)?;
        }
        Self::load(project_dir)
    }

    /// Overwrite the status file in `project_dir` with `self`.
    pub fn save(&self, project_dir: &Path) -> Result<(), CoreError> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| CoreError::Internal(format!("Failed to encode status file: {e}")))?;
        std::fs::write(project_dir.join(STATUS_FILE_NAME), yaml)?;
        Ok(())
    }

    /// Record `job_id` for `kind`, keeping the other kind's id.
    pub fn record(project_dir: &Path, kind: JobKind, job_id: &str) -> Result<Self, CoreError> {
        let mut status = Self::load_or_create(project_dir)?;
        status.set(kind, job_id);
        status.save(project_dir)?;
        tracing::debug!(
            dir = %project_dir.display(),
            kind = kind.as_str(),
            job_id,
            "Recorded job id"
        );
        Ok(status)
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    let text = match value {
        None | Some(serde_yaml::Value::Null) => return Ok(None),
        Some(serde_yaml::Value::String(s)) => s,
        // Bare numeric ids (`frame: 12345`) parse as YAML numbers.
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a job id, found {other:?}"
            )))
        }
    };
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
