//! Route definitions for job submission.

use axum::routing::post;
use axum::Router;

use crate::handlers::render;
use crate::state::AppState;

/// Routes mounted at `/render`.
///
/// ```text
/// POST   /frames     -> submit_frames (multipart)
/// POST   /video      -> submit_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/frames", post(render::submit_frames))
        .route("/video", post(render::submit_video))
}
