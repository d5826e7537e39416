//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /new        -> new_project
/// POST   /new        -> create
/// POST   /delete     -> delete
/// POST   /rename     -> rename (duplicate)
/// GET    /{name}     -> show
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(project::new_project).post(project::create))
        .route("/delete", post(project::delete))
        .route("/rename", post(project::rename))
        .route("/{name}", get(project::show))
}
