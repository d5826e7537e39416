//! One-shot flash messages.
//!
//! A mutating handler stores a [`Flash`] before redirecting; the next view
//! handler takes it, which clears the slot. The service is single-user, so
//! one slot is shared by all requests.

use std::sync::{Mutex, PoisonError};

use axum::response::Redirect;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FlashSlot {
    inner: Mutex<Option<Flash>>,
}

impl FlashSlot {
    /// Store `flash`, replacing any message not yet shown.
    pub fn set(&self, flash: Flash) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(flash);
    }

    /// Take the pending message, leaving the slot empty.
    pub fn take(&self) -> Option<Flash> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Store `flash` and redirect to `to`.
    pub fn redirect(&self, flash: Flash, to: &str) -> Redirect {
        self.set(flash);
        Redirect::to(to)
    }
}
