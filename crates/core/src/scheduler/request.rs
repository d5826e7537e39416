//! Job submission requests and their `sbatch` argument vectors.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::SchedulerError;

/// Which of a project's two job slots a submission fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Frame,
    Video,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::Video => "video",
        }
    }
}

/// Resource request shared by both job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resources {
    pub cpus: u32,
    /// Wall-clock limit in whole hours.
    pub hours: u32,
}

impl Resources {
    /// Wall time in Slurm's `HH:00:00` form.
    pub fn walltime(&self) -> String {
        format!("{:02}:00:00", self.hours)
    }
}

/// Render a range of frames from a Blender scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJob {
    pub blend_file: PathBuf,
    pub output_dir: PathBuf,
    /// Blender frame range expression, e.g. `1..240`.
    pub frames_range: String,
}

/// Assemble rendered frames into a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJob {
    pub frames_dir: PathBuf,
    pub frames_per_second: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpec {
    Frames(FrameJob),
    Video(VideoJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub job: JobSpec,
    pub resources: Resources,
}

impl SubmitRequest {
    pub fn kind(&self) -> JobKind {
        match self.job {
            JobSpec::Frames(_) => JobKind::Frame,
            JobSpec::Video(_) => JobKind::Video,
        }
    }

    /// Job name shown in the scheduler queue.
    pub fn job_name(&self) -> String {
        match &self.job {
            JobSpec::Frames(job) => {
                let stem = job
                    .blend_file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("blender-{stem}")
            }
            JobSpec::Video(_) => "blender-video".to_string(),
        }
    }

    /// Directory the job writes its output and log into.
    pub fn output_dir(&self) -> &Path {
        match &self.job {
            JobSpec::Frames(job) => &job.output_dir,
            JobSpec::Video(job) => &job.frames_dir,
        }
    }

    /// `KEY=value` pairs exported into the batch script's environment.
    pub fn exports(&self) -> Vec<(&'static str, String)> {
        match &self.job {
            JobSpec::Frames(job) => vec![
                ("BLEND_FILE_PATH", job.blend_file.display().to_string()),
                ("OUTPUT_DIR", job.output_dir.display().to_string()),
                ("FRAMES_RANGE", job.frames_range.clone()),
            ],
            JobSpec::Video(job) => vec![
                ("FRAMES_PER_SEC", job.frames_per_second.to_string()),
                ("FRAMES_DIR", job.frames_dir.display().to_string()),
            ],
        }
    }

    /// Build the full `sbatch` argument vector, ending with `script`.
    ///
    /// `%j` in the log path is expanded by Slurm to the job id.
    pub fn sbatch_args(&self, cluster: &str, script: &Path) -> Result<Vec<String>, SchedulerError> {
        if self.resources.cpus == 0 {
            return Err(SchedulerError::InvalidRequest(
                "cpu count must be at least 1".to_string(),
            ));
        }

        let mut exports = Vec::new();
        for (key, value) in self.exports() {
            // Commas separate entries in `--export`.
            if value.contains(',') {
                return Err(SchedulerError::InvalidRequest(format!(
                    "{key} must not contain ',': {value}"
                )));
            }
            exports.push(format!("{key}={value}"));
        }

        let log_name = format!("{}-render-%j.out", self.kind().as_str());
        let log_path = self.output_dir().join(log_name);

        Ok(vec![
            "-J".to_string(),
            self.job_name(),
            "--parsable".to_string(),
            "--export".to_string(),
            exports.join(","),
            "-n".to_string(),
            self.resources.cpus.to_string(),
            "-t".to_string(),
            self.resources.walltime(),
            "-M".to_string(),
            cluster.to_string(),
            "--output".to_string(),
            log_path.display().to_string(),
            script.display().to_string(),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn frame_request() -> SubmitRequest {
        SubmitRequest {
            job: JobSpec::Frames(FrameJob {
                blend_file: PathBuf::from("/srv/projects/input_files/monkey.blend"),
                output_dir: PathBuf::from("/srv/projects/demo"),
                frames_range: "1..120".to_string(),
            }),
            resources: Resources { cpus: 8, hours: 3 },
        }
    }

    #[test]
    fn walltime_is_zero_padded() {
        assert_eq!(Resources { cpus: 1, hours: 1 }.walltime(), "01:00:00");
        assert_eq!(Resources { cpus: 1, hours: 12 }.walltime(), "12:00:00");
        assert_eq!(Resources { cpus: 1, hours: 100 }.walltime(), "100:00:00");
    }

    #[test]
    fn frame_job_arguments() {
        let args = frame_request()
            .sbatch_args("pitzer", Path::new("/opt/app/render_frames.sh"))
            .expect("args");
        assert_eq!(
            args,
            vec![
                "-J",
                "blender-monkey",
                "--parsable",
                "--export",
                "BLEND_FILE_PATH=/srv/projects/input_files/monkey.blend,OUTPUT_DIR=/srv/projects/demo,FRAMES_RANGE=1..120",
                "-n",
                "8",
                "-t",
                "03:00:00",
                "-M",
                "pitzer",
                "--output",
                "/srv/projects/demo/frame-render-%j.out",
                "/opt/app/render_frames.sh",
            ]
        );
    }

    #[test]
    fn video_job_arguments() {
        let request = SubmitRequest {
            job: JobSpec::Video(VideoJob {
                frames_dir: PathBuf::from("/srv/projects/demo"),
                frames_per_second: 24,
            }),
            resources: Resources { cpus: 2, hours: 1 },
        };
        assert_eq!(request.kind(), JobKind::Video);
        let args = request
            .sbatch_args("pitzer", Path::new("render_video.sh"))
            .expect("args");
        assert_eq!(args[1], "blender-video");
        assert_eq!(args[4], "FRAMES_PER_SEC=24,FRAMES_DIR=/srv/projects/demo");
        assert_eq!(args[12], "/srv/projects/demo/video-render-%j.out");
        assert_eq!(args.last().map(String::as_str), Some("render_video.sh"));
    }

    #[test]
    fn comma_in_export_value_is_rejected() {
        let mut request = frame_request();
        if let JobSpec::Frames(job) = &mut request.job {
            job.frames_range = "1,5".to_string();
        }
        assert_matches!(
            request.sbatch_args("pitzer", Path::new("s.sh")),
            Err(SchedulerError::InvalidRequest(_))
        );
    }

    #[test]
    fn zero_cpus_is_rejected() {
        let mut request = frame_request();
        request.resources.cpus = 0;
        assert_matches!(
            request.sbatch_args("pitzer", Path::new("s.sh")),
            Err(SchedulerError::InvalidRequest(_))
        );
    }
}
