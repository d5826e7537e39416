use std::sync::Arc;

use blendfarm_core::project::ProjectStore;
use blendfarm_core::scheduler::Scheduler;

use crate::config::ServerConfig;
use crate::flash::FlashSlot;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Project directory store rooted at `config.projects_root`.
    pub projects: ProjectStore,
    /// Batch scheduler used for state queries and submissions.
    pub scheduler: Arc<dyn Scheduler>,
    /// Pending flash message for the next view.
    pub flash: Arc<FlashSlot>,
    /// Project accounts of the user running the server.
    pub accounts: Arc<Vec<String>>,
}
