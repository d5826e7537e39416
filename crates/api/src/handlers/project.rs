//! Handlers for the index and the `/projects` resource.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use blendfarm_core::job_state::translate;
use blendfarm_core::project::is_reserved_name;
use blendfarm_core::scheduler::JobKind;
use serde::Deserialize;

use super::{blocking, describe, project_url};
use crate::error::AppResult;
use crate::extract::ValidForm;
use crate::flash::Flash;
use crate::response::{DataResponse, IndexView, NewProjectView, ProjectView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectForm {
    pub dir: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameProjectForm {
    pub dir: String,
    pub rename: String,
}

/// GET /
pub async fn index(State(state): State<AppState>) -> AppResult<Json<DataResponse<IndexView>>> {
    tracing::info!("Requesting the index");
    let flash = state
        .flash
        .take()
        .unwrap_or_else(|| Flash::info(format!("Welcome to {}!", state.config.app_title)));

    let store = state.projects.clone();
    let projects = blocking(move || store.list()).await?;

    Ok(Json(DataResponse {
        data: IndexView {
            title: state.config.app_title.clone(),
            flash: Some(flash),
            projects,
            accounts: state.accounts.as_ref().clone(),
        },
    }))
}

/// GET /projects/new
pub async fn new_project(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<NewProjectView>>> {
    let store = state.projects.clone();
    let uploaded_blend_files = blocking(move || store.uploaded_blend_files()).await?;

    Ok(Json(DataResponse {
        data: NewProjectView {
            title: state.config.app_title.clone(),
            flash: state.flash.take(),
            uploaded_blend_files,
        },
    }))
}

/// GET /projects/{name}
///
/// Reserved names show the new-project view. A project that cannot be read
/// redirects to the index with a danger flash.
pub async fn show(State(state): State<AppState>, Path(name): Path<String>) -> AppResult<Response> {
    if is_reserved_name(&name) {
        return Ok(new_project(State(state)).await?.into_response());
    }

    let store = state.projects.clone();
    let lookup = name.clone();
    let opened = blocking(move || {
        let snapshot = store.open(&lookup)?;
        let uploaded = store.uploaded_blend_files()?;
        Ok((snapshot, uploaded))
    })
    .await;

    let (snapshot, uploaded_blend_files) = match opened {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(project = %name, error = %e, "Project not viewable");
            let redirect = state
                .flash
                .redirect(Flash::danger(format!("{name} does not exist")), "/");
            return Ok(redirect.into_response());
        }
    };

    let scheduler = state.scheduler.as_ref();
    let (frame_job, video_job) = tokio::join!(
        translate(scheduler, snapshot.status.job_id(JobKind::Frame)),
        translate(scheduler, snapshot.status.job_id(JobKind::Video)),
    );

    let view = ProjectView {
        title: state.config.app_title.clone(),
        flash: state.flash.take(),
        name: snapshot.name,
        display_name: snapshot.display_name,
        images: snapshot.images,
        uploaded_blend_files,
        status_file: snapshot.status,
        frame_job,
        video_job,
    };
    Ok(Json(DataResponse { data: view }).into_response())
}

/// POST /projects/new
pub async fn create(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<CreateProjectForm>,
) -> Redirect {
    tracing::info!(name = %form.name, "Creating project");

    let store = state.projects.clone();
    let name = form.name.clone();
    match blocking(move || store.create(&name)).await {
        Ok(dir) => state.flash.redirect(
            Flash::info(format!("made new project '{}'", form.name)),
            &project_url(&dir),
        ),
        Err(e) => {
            tracing::warn!(name = %form.name, error = %e, "Project creation failed");
            state
                .flash
                .redirect(Flash::danger(format!("could not create project: {}", describe(&e))), "/")
        }
    }
}

/// POST /projects/delete
pub async fn delete(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<DeleteProjectForm>,
) -> Redirect {
    let store = state.projects.clone();
    let dir = form.dir.clone();
    let flash = match blocking(move || store.delete(&dir)).await {
        Ok(()) => Flash::info("deleted a project"),
        Err(e) => {
            tracing::warn!(dir = %form.dir, error = %e, "Project deletion failed");
            Flash::danger(format!("could not delete project: {}", describe(&e)))
        }
    };
    state.flash.redirect(flash, "/")
}

/// POST /projects/rename
///
/// Copies the project under the new name and keeps the original.
pub async fn rename(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<RenameProjectForm>,
) -> Redirect {
    let store = state.projects.clone();
    let (dir, rename) = (form.dir.clone(), form.rename.clone());
    let flash = match blocking(move || store.duplicate(&dir, &rename)).await {
        Ok(_) => Flash::info("duplicated and renamed project"),
        Err(e) => {
            tracing::warn!(dir = %form.dir, rename = %form.rename, error = %e, "Project duplication failed");
            Flash::danger(format!("could not duplicate project: {}", describe(&e)))
        }
    };
    state.flash.redirect(flash, "/")
}
