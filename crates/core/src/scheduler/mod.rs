//! Batch scheduler interface.
//!
//! The web layer only ever talks to a [`Scheduler`]: one call to read a
//! job's state code, one to submit a job. [`slurm::SlurmScheduler`] is the
//! production adapter that shells out to `squeue` / `sbatch`; tests
//! substitute an in-memory recorder.

pub mod request;
pub mod slurm;
pub mod subprocess;

pub use request::{FrameJob, JobKind, JobSpec, Resources, SubmitRequest, VideoJob};

/// Scheduler-assigned job identifier.
pub type JobId = String;

/// Errors from talking to the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler command could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command did not finish within the configured timeout.
    #[error("Scheduler command timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The command exited unsuccessfully.
    #[error("Scheduler rejected the request (exit code {exit_code}): {output}")]
    Rejected { exit_code: i32, output: String },

    /// The command succeeded but printed no job id.
    #[error("Scheduler returned an empty reply")]
    EmptyReply,

    /// The request cannot be turned into a valid command line.
    #[error("Invalid job request: {0}")]
    InvalidRequest(String),
}

/// Narrow interface to the batch scheduler.
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    /// Return the raw state code the scheduler reports for `job_id`.
    ///
    /// An empty string means the scheduler no longer lists the job.
    async fn query_state(&self, job_id: &str) -> Result<String, SchedulerError>;

    /// Submit a job and return its id.
    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, SchedulerError>;
}

/// Extract the job id from a `sbatch --parsable` reply.
///
/// The reply is `<job id>[;<cluster>]`; only the first field is kept.
pub fn parse_job_id(reply: &str) -> Result<JobId, SchedulerError> {
    let id = reply.trim().split(';').next().unwrap_or_default().trim();
    if id.is_empty() {
        return Err(SchedulerError::EmptyReply);
    }
    Ok(id.to_string())
}

/// Shared test helpers for subprocess-spawning tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::{Mutex, MutexGuard};

    static SPAWN_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that write a script and then execute it, so no other
    /// test forks while a script is still open for writing (`ETXTBSY`).
    pub fn spawn_lock() -> MutexGuard<'static, ()> {
        SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn job_id_without_cluster() {
        assert_eq!(parse_job_id("4242\n").expect("id"), "4242");
    }

    #[test]
    fn job_id_with_cluster_suffix() {
        assert_eq!(parse_job_id("  98765;pitzer\n").expect("id"), "98765");
    }

    #[test]
    fn empty_reply_is_an_error() {
        assert_matches!(parse_job_id(""), Err(SchedulerError::EmptyReply));
        assert_matches!(parse_job_id(" \n"), Err(SchedulerError::EmptyReply));
        assert_matches!(parse_job_id(";pitzer"), Err(SchedulerError::EmptyReply));
    }

    #[test]
    fn rejected_error_message() {
        let err = SchedulerError::Rejected {
            exit_code: 1,
            output: "sbatch: error: invalid partition".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Scheduler rejected the request (exit code 1): sbatch: error: invalid partition"
        );
    }
}
