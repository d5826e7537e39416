//! A hung scheduler must not time out the project view.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use blendfarm_core::scheduler::{JobId, Scheduler, SchedulerError, SubmitRequest};
use blendfarm_core::status_file::StatusFile;
use common::{body_json, build_router, get, test_config};

/// Scheduler whose state queries stall, then fail with a timeout.
struct StallingScheduler {
    stall: Duration,
}

#[async_trait::async_trait]
impl Scheduler for StallingScheduler {
    async fn query_state(&self, _job_id: &str) -> Result<String, SchedulerError> {
        tokio::time::sleep(self.stall).await;
        Err(SchedulerError::Timeout {
            elapsed_ms: self.stall.as_millis() as u64,
        })
    }

    async fn submit(&self, _request: &SubmitRequest) -> Result<JobId, SchedulerError> {
        Err(SchedulerError::EmptyReply)
    }
}

#[tokio::test]
async fn stalled_lookups_render_unknown_within_request_timeout() {
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(root.path());
    // Each lookup takes 75% of the request budget; both fit only if they overlap.
    config.request_timeout_secs = 2;
    let router = build_router(
        config,
        Arc::new(StallingScheduler {
            stall: Duration::from_millis(1500),
        }),
    );

    let project = root.path().join("stalled");
    std::fs::create_dir(&project).unwrap();
    StatusFile {
        frame: Some("1".to_string()),
        video: Some("2".to_string()),
    }
    .save(&project)
    .unwrap();

    let response = get(&router, "/projects/stalled").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    for slot in ["frame_job", "video_job"] {
        assert_eq!(json["data"][slot]["state"], "Unknown", "{slot}");
        assert_eq!(json["data"][slot]["badge"], "warning", "{slot}");
    }
}
