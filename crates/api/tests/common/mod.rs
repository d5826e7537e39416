#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use blendfarm_api::config::ServerConfig;
use blendfarm_api::flash::FlashSlot;
use blendfarm_api::router::build_app_router;
use blendfarm_api::state::AppState;
use blendfarm_core::project::ProjectStore;
use blendfarm_core::scheduler::slurm::SlurmConfig;
use blendfarm_core::scheduler::{JobId, Scheduler, SchedulerError, SubmitRequest};

pub const BOUNDARY: &str = "blendfarm-test-boundary";

/// In-memory scheduler that records submissions and serves canned states.
#[derive(Default)]
pub struct RecordingScheduler {
    pub states: Mutex<HashMap<String, String>>,
    pub submissions: Mutex<Vec<SubmitRequest>>,
    pub reject_with: Mutex<Option<String>>,
    next_id: Mutex<u64>,
}

impl RecordingScheduler {
    pub fn set_state(&self, job_id: &str, code: &str) {
        self.states
            .lock()
            .unwrap()
            .insert(job_id.to_string(), code.to_string());
    }

    pub fn reject(&self, message: &str) {
        *self.reject_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Scheduler for RecordingScheduler {
    async fn query_state(&self, job_id: &str) -> Result<String, SchedulerError> {
        self.states
            .lock()
            .unwrap()
            .get(job_id)
            .cloned()
            .ok_or_else(|| SchedulerError::Rejected {
                exit_code: 1,
                output: format!("unknown job {job_id}"),
            })
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<JobId, SchedulerError> {
        if let Some(message) = self.reject_with.lock().unwrap().clone() {
            return Err(SchedulerError::Rejected {
                exit_code: 1,
                output: message,
            });
        }
        self.submissions.lock().unwrap().push(request.clone());
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        Ok(format!("{}", 1000 + *next))
    }
}

/// A running test application over a temporary projects root.
pub struct TestApp {
    pub router: Router,
    pub scheduler: Arc<RecordingScheduler>,
    pub root: tempfile::TempDir,
}

impl TestApp {
    pub fn projects_root(&self) -> &Path {
        self.root.path()
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        send(self.router.clone(), Method::GET, uri, None, Body::empty()).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        send(
            self.router.clone(),
            Method::POST,
            uri,
            Some("application/x-www-form-urlencoded".to_string()),
            Body::from(body),
        )
        .await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>) -> Response<Body> {
        send(
            self.router.clone(),
            Method::POST,
            uri,
            Some(format!("multipart/form-data; boundary={BOUNDARY}")),
            Body::from(body),
        )
        .await
    }

    /// Create a project through the API and return its directory name.
    pub async fn create_project(&self, name: &str) -> String {
        let response = self.post_form("/projects/new", &[("name", name)]).await;
        assert_eq!(response.status(), 303, "project creation should redirect");
        name.replace(' ', "_")
    }
}

/// Build a test `ServerConfig` rooted at `projects_root`.
pub fn test_config(projects_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_title: "Test Farm".to_string(),
        projects_root: projects_root.to_path_buf(),
        max_upload_bytes: 16 * 1024 * 1024,
        slurm: SlurmConfig {
            sbatch_path: "/nonexistent/sbatch".to_string(),
            squeue_path: "/nonexistent/squeue".to_string(),
            cluster: "pitzer".to_string(),
            frame_script: PathBuf::from("render_frames.sh"),
            video_script: PathBuf::from("render_video.sh"),
            timeout: Duration::from_secs(5),
        },
    }
}

/// Build the full application router with a recording scheduler.
pub fn build_test_app() -> TestApp {
    let root = tempfile::tempdir().expect("create projects root");
    let scheduler = Arc::new(RecordingScheduler::default());
    let router = build_router(test_config(root.path()), scheduler.clone());

    TestApp {
        router,
        scheduler,
        root,
    }
}

/// Build the full application router around any scheduler and config.
pub fn build_router(config: ServerConfig, scheduler: Arc<dyn Scheduler>) -> Router {
    let projects = ProjectStore::new(&config.projects_root);
    projects.ensure_layout().expect("create layout");

    let state = AppState {
        config: Arc::new(config.clone()),
        projects,
        scheduler,
        flash: Arc::new(FlashSlot::default()),
        accounts: Arc::new(vec!["PZS0001".to_string()]),
    };
    build_app_router(state, &config)
}

/// Send a GET request to `router`.
pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    send(router.clone(), Method::GET, uri, None, Body::empty()).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    content_type: Option<String>,
    body: Body,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Builder for a `multipart/form-data` body using [`BOUNDARY`].
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}
