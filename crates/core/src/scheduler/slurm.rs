//! Slurm adapter: `squeue` for state queries, `sbatch` for submissions.

use std::path::PathBuf;
use std::time::Duration;

use super::request::{JobSpec, SubmitRequest};
use super::subprocess::run_command;
use super::{parse_job_id, JobId, Scheduler, SchedulerError};

/// `squeue` prints this once a finished job has been purged from the queue.
const PURGED_JOB_MARKER: &str = "Invalid job id";

/// Paths and settings for the Slurm command-line tools.
#[derive(Debug, Clone)]
pub struct SlurmConfig {
    pub sbatch_path: String,
    pub squeue_path: String,
    /// Cluster passed to `sbatch -M`.
    pub cluster: String,
    pub frame_script: PathBuf,
    pub video_script: PathBuf,
    pub timeout: Duration,
}

pub struct SlurmScheduler {
    config: SlurmConfig,
}

impl SlurmScheduler {
    pub fn new(config: SlurmConfig) -> Self {
        Self { config }
    }

    /// Arguments for `squeue`: only the state column, no header.
    pub fn squeue_args(job_id: &str) -> Vec<String> {
        vec![
            "-j".to_string(),
            job_id.to_string(),
            "-h".to_string(),
            "-o".to_string(),
            "%t".to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl Scheduler for SlurmScheduler {
    async fn query_state(&self, job_id: &str) -> Result<String, SchedulerError> {
        let output = run_command(
            &self.config.squeue_path,
            &Self::squeue_args(job_id),
            self.config.timeout,
        )
        .await?;

        if output.success() {
            return Ok(output.stdout.trim().to_string());
        }
        if output.stderr.contains(PURGED_JOB_MARKER) {
            tracing::debug!(job_id, "Job no longer listed by squeue");
            return Ok(String::new());
        }
        Err(SchedulerError::Rejected {
            exit_code: output.exit_code,
            output: output.combined(),
        })
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, SchedulerError> {
        let script = match request.job {
            JobSpec::Frames(_) => &self.config.frame_script,
            JobSpec::Video(_) => &self.config.video_script,
        };
        let args = request.sbatch_args(&self.config.cluster, script)?;

        tracing::info!(
            kind = request.kind().as_str(),
            job_name = %request.job_name(),
            cpus = request.resources.cpus,
            walltime = %request.resources.walltime(),
            "Submitting job to sbatch"
        );

        let output = run_command(&self.config.sbatch_path, &args, self.config.timeout).await?;
        if !output.success() {
            return Err(SchedulerError::Rejected {
                exit_code: output.exit_code,
                output: output.combined(),
            });
        }

        let job_id = parse_job_id(&output.stdout)?;
        tracing::info!(%job_id, duration_ms = output.duration_ms, "Job submitted");
        Ok(job_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
