//! Scheduler state code translation.
//!
//! Slurm reports a one or two letter state code per job (`squeue -o %t`).
//! The front-end only distinguishes four coarse states, each rendered with a
//! fixed badge colour.

use serde::Serialize;

use crate::scheduler::Scheduler;

/// Coarse job state shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Running,
    Queued,
    Completed,
    Unknown,
}

impl JobState {
    /// Translate a scheduler state code.
    ///
    /// An empty code means the scheduler no longer lists the job, which is
    /// reported as completed. Unrecognised codes map to [`JobState::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "" | "C" => Self::Completed,
            "R" => Self::Running,
            "Q" | "CF" | "PD" => Self::Queued,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Queued => "Queued",
            Self::Completed => "Completed",
            Self::Unknown => "Unknown",
        }
    }

    pub fn badge(self) -> Badge {
        match self {
            Self::Running => Badge::Success,
            Self::Queued => Badge::Info,
            Self::Completed => Badge::Primary,
            Self::Unknown => Badge::Warning,
        }
    }
}

/// Display badge for a job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Success,
    Info,
    Primary,
    Warning,
}

impl Badge {
    /// Badge for an optional state; a slot with no job shows `warning`.
    pub fn for_state(state: Option<JobState>) -> Self {
        state.map_or(Self::Warning, JobState::badge)
    }
}

/// State and badge of one job slot (frame or video) of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub job_id: Option<String>,
    pub state: Option<JobState>,
    pub badge: Badge,
}

/// Query the scheduler for `job_id` and translate the reply.
///
/// Never fails: a scheduler error is logged and reported as
/// [`JobState::Unknown`]. A slot without a job id is not queried.
pub async fn translate(scheduler: &dyn Scheduler, job_id: Option<&str>) -> JobStatus {
    let Some(id) = job_id.filter(|id| !id.trim().is_empty()) else {
        return JobStatus {
            job_id: None,
            state: None,
            badge: Badge::for_state(None),
        };
    };

    let state = match scheduler.query_state(id).await {
        Ok(code) => JobState::from_code(&code),
        Err(e) => {
            tracing::warn!(job_id = %id, error = %e, "Job state query failed");
            JobState::Unknown
        }
    };

    JobStatus {
        job_id: Some(id.to_string()),
        state: Some(state),
        badge: state.badge(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
