//! Request extractors that reject with [`AppError`].

use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Request};
use axum::Form;

use crate::error::AppError;

/// URL-encoded form body.
///
/// Same as [`Form`], but a missing or malformed field is reported as a JSON
/// `BAD_REQUEST` body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Form rejected");
                AppError::BadRequest(rejection.body_text())
            })?;
        Ok(Self(value))
    }
}
