//! Shared response envelope and view payloads.
//!
//! All views use a `{ "data": ... }` envelope. The view structs are what a
//! front-end renders; they carry the pending flash message so a redirect
//! target can show it.

use blendfarm_core::job_state::JobStatus;
use blendfarm_core::project::ProjectEntry;
use blendfarm_core::status_file::StatusFile;
use serde::Serialize;

use crate::flash::Flash;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `GET /`
#[derive(Debug, Serialize)]
pub struct IndexView {
    pub title: String,
    pub flash: Option<Flash>,
    pub projects: Vec<ProjectEntry>,
    pub accounts: Vec<String>,
}

/// `GET /projects/new`
#[derive(Debug, Serialize)]
pub struct NewProjectView {
    pub title: String,
    pub flash: Option<Flash>,
    pub uploaded_blend_files: Vec<String>,
}

/// `GET /projects/{name}`
#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub title: String,
    pub flash: Option<Flash>,
    pub name: String,
    pub display_name: String,
    pub images: Vec<String>,
    pub uploaded_blend_files: Vec<String>,
    /// Raw contents of the status file.
    pub status_file: StatusFile,
    pub frame_job: JobStatus,
    pub video_job: JobStatus,
}
