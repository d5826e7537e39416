//! Handlers for submitting render jobs.
//!
//! Both handlers end in a redirect to the project view; failures are shown
//! there as a danger flash and leave the status file untouched.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::Redirect;
use blendfarm_core::error::CoreError;
use blendfarm_core::hashing::store_upload;
use blendfarm_core::scheduler::{FrameJob, JobSpec, Resources, SubmitRequest, VideoJob};
use blendfarm_core::status_file::StatusFile;
use serde::Deserialize;

use super::{blocking, describe, project_url};
use crate::error::{AppError, AppResult};
use crate::extract::ValidForm;
use crate::flash::Flash;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoForm {
    pub dir: String,
    pub num_cpus: String,
    pub num_hours: String,
    pub frames_per_second: String,
}

/// Scene file supplied with a frame job.
#[derive(Debug)]
enum SceneSource {
    /// Name of a file already in the shared input directory.
    Existing(String),
    /// Freshly uploaded file.
    Upload { file_name: String, data: Bytes },
}

/// Fields of the multipart frame-render form.
#[derive(Debug, Default)]
struct FrameForm {
    dir: String,
    num_cpus: String,
    num_hours: String,
    frames_range: String,
    uploaded_blend_file: Option<String>,
    upload: Option<(String, Bytes)>,
}

impl FrameForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "blend_file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // Browsers send an empty part when no file was chosen.
                if !file_name.is_empty() {
                    form.upload = Some((file_name, data));
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            match name.as_str() {
                "dir" => form.dir = value,
                "num_cpus" => form.num_cpus = value,
                "num_hours" => form.num_hours = value,
                "frames_range" => form.frames_range = value,
                "uploaded_blend_file" if !value.trim().is_empty() => {
                    form.uploaded_blend_file = Some(value)
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// Move the scene out of the form; an upload wins over a selected file.
    fn take_scene(&mut self) -> Result<SceneSource, CoreError> {
        if let Some((file_name, data)) = self.upload.take() {
            return Ok(SceneSource::Upload { file_name, data });
        }
        self.uploaded_blend_file
            .take()
            .map(SceneSource::Existing)
            .ok_or_else(|| CoreError::Validation("no scene file selected".to_string()))
    }
}

/// POST /render/frames
pub async fn submit_frames(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Redirect> {
    let mut form = FrameForm::read(multipart).await?;
    tracing::info!(
        dir = %form.dir,
        num_cpus = %form.num_cpus,
        num_hours = %form.num_hours,
        frames_range = %form.frames_range,
        "Trying to render frames"
    );

    let prepared = prepare_frames(&state, &mut form).await;
    let request = match prepared {
        Ok(request) => request,
        Err(e) => return Ok(reject(&state, &form.dir, &e).await),
    };
    Ok(submit_and_record(&state, &form.dir, request).await)
}

/// POST /render/video
pub async fn submit_video(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<VideoForm>,
) -> Redirect {
    tracing::info!(
        dir = %form.dir,
        num_cpus = %form.num_cpus,
        num_hours = %form.num_hours,
        frames_per_second = %form.frames_per_second,
        "Trying to render video"
    );

    let prepared = prepare_video(&state, &form).await;
    match prepared {
        Ok(request) => submit_and_record(&state, &form.dir, request).await,
        Err(e) => reject(&state, &form.dir, &e).await,
    }
}

async fn prepare_frames(state: &AppState, form: &mut FrameForm) -> AppResult<SubmitRequest> {
    let resources = parse_resources(&form.num_cpus, &form.num_hours)?;
    if form.frames_range.trim().is_empty() {
        return Err(CoreError::Validation("frames range must not be empty".to_string()).into());
    }

    let scene = form.take_scene()?;
    let store = state.projects.clone();
    let dir = form.dir.clone();
    let (output_dir, blend_file) = blocking(move || {
        let output_dir = store.existing_project_path(&dir)?;
        let blend_file = match scene {
            SceneSource::Existing(name) => {
                let path = store.input_file_path(&name)?;
                if !path.is_file() {
                    return Err(CoreError::NotFound {
                        entity: "Scene file",
                        id: name,
                    });
                }
                path
            }
            SceneSource::Upload { file_name, data } => {
                let path = store.input_file_path(&file_name)?;
                store_upload(&data, &path)?;
                path
            }
        };
        Ok((output_dir, blend_file))
    })
    .await?;

    Ok(SubmitRequest {
        job: JobSpec::Frames(FrameJob {
            blend_file,
            output_dir,
            frames_range: form.frames_range.trim().to_string(),
        }),
        resources,
    })
}

async fn prepare_video(state: &AppState, form: &VideoForm) -> AppResult<SubmitRequest> {
    let resources = parse_resources(&form.num_cpus, &form.num_hours)?;
    let frames_per_second = parse_positive("frames per second", &form.frames_per_second)?;

    let store = state.projects.clone();
    let dir = form.dir.clone();
    let frames_dir = blocking(move || store.existing_project_path(&dir)).await?;

    Ok(SubmitRequest {
        job: JobSpec::Video(VideoJob {
            frames_dir,
            frames_per_second,
        }),
        resources,
    })
}

/// Submit `request` and record the returned id in the project's status file.
async fn submit_and_record(state: &AppState, dir: &str, request: SubmitRequest) -> Redirect {
    let kind = request.kind();
    let job_id = match state.scheduler.submit(&request).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(dir, kind = kind.as_str(), error = %e, "Job submission failed");
            return state.flash.redirect(
                Flash::danger(format!("failed to submit job: {e}")),
                &project_url(dir),
            );
        }
    };

    let project_dir = request.output_dir().to_path_buf();
    let id = job_id.clone();
    if let Err(e) = blocking(move || StatusFile::record(&project_dir, kind, &id)).await {
        tracing::error!(dir, %job_id, error = %e, "Could not record job id");
        return state.flash.redirect(
            Flash::danger(format!("submitted job {job_id} but could not record it")),
            &project_url(dir),
        );
    }

    state
        .flash
        .redirect(Flash::info(format!("submitted job {job_id}")), &project_url(dir))
}

/// Redirect after a request that never reached the scheduler.
///
/// Goes back to the project when `dir` names an existing one, else to `/`.
async fn reject(state: &AppState, dir: &str, err: &AppError) -> Redirect {
    tracing::warn!(dir, error = %err, "Render request rejected");
    let message = format!("could not submit job: {}", describe(err));

    let store = state.projects.clone();
    let lookup = dir.to_string();
    let target = match blocking(move || store.existing_project_path(&lookup)).await {
        Ok(_) => project_url(dir),
        Err(_) => "/".to_string(),
    };
    state.flash.redirect(Flash::danger(message), &target)
}

fn parse_resources(cpus: &str, hours: &str) -> Result<Resources, CoreError> {
    Ok(Resources {
        cpus: parse_positive("cpu count", cpus)?,
        hours: parse_positive("hours", hours)?,
    })
}

fn parse_positive(field: &str, value: &str) -> Result<u32, CoreError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CoreError::Validation(format!(
            "{field} must be a positive whole number, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_numbers_parse() {
        assert_eq!(parse_positive("hours", " 4 ").expect("parse"), 4);
        assert!(parse_positive("hours", "0").is_err());
        assert!(parse_positive("hours", "-1").is_err());
        assert!(parse_positive("hours", "two").is_err());
        assert!(parse_positive("hours", "").is_err());
    }

    #[test]
    fn upload_wins_over_selected_file() {
        let mut form = FrameForm {
            uploaded_blend_file: Some("old.blend".to_string()),
            upload: Some(("new.blend".to_string(), Bytes::from_static(b"data"))),
            ..FrameForm::default()
        };
        assert!(matches!(
            form.take_scene(),
            Ok(SceneSource::Upload { ref file_name, ref data })
                if file_name == "new.blend" && data.as_ref() == b"data"
        ));
        assert!(form.upload.is_none());
    }

    #[test]
    fn missing_scene_is_a_validation_error() {
        assert!(matches!(
            FrameForm::default().take_scene(),
            Err(CoreError::Validation(_))
        ));
    }
}
