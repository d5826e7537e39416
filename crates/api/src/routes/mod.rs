pub mod health;
pub mod project;
pub mod render;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// GET  /                     index
/// /health                    health check
/// /projects                  project views and project management forms
/// /render                    job submission forms
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::project::index))
        .merge(health::router())
        .nest("/projects", project::router())
        .nest("/render", render::router())
}
