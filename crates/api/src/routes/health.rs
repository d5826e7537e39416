use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the projects root is a readable directory.
    pub projects_root_ok: bool,
}

/// GET /health -- returns service and storage health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let root = state.projects.root().to_path_buf();
    let projects_root_ok = tokio::fs::read_dir(&root).await.is_ok();

    let status = if projects_root_ok { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        projects_root_ok,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
