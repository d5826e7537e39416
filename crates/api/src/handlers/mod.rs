pub mod project;
pub mod render;

use blendfarm_core::error::CoreError;

use crate::error::{AppError, AppResult};

/// Run synchronous filesystem work from the core crate on a blocking thread.
pub(crate) async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalError(format!("Blocking task failed: {e}")))?
        .map_err(AppError::from)
}

/// URL of a project's view.
pub(crate) fn project_url(name: &str) -> String {
    format!("/projects/{}", urlencoding::encode(name))
}

/// Message shown to the user for a failed form submission.
pub(crate) fn describe(err: &AppError) -> String {
    match err {
        AppError::Core(CoreError::NotFound { id, .. }) => format!("{id} does not exist"),
        AppError::Core(CoreError::Validation(msg) | CoreError::Conflict(msg))
        | AppError::BadRequest(msg) => msg.clone(),
        _ => "an internal error occurred".to_string(),
    }
}
