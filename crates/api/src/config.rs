use std::path::PathBuf;
use std::time::Duration;

use blendfarm_core::scheduler::slurm::SlurmConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to the render
/// scripts on a cluster login node.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Title shown on every view.
    pub app_title: String,
    /// Directory holding one subdirectory per project.
    pub projects_root: PathBuf,
    /// Maximum request body size, sized for scene uploads.
    pub max_upload_bytes: usize,
    /// Slurm command-line tools and batch scripts.
    pub slurm: SlurmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                      |
    /// |--------------------------|------------------------------|
    /// | `HOST`                   | `0.0.0.0`                    |
    /// | `PORT`                   | `3000`                       |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`   | `60`                         |
    /// | `APP_TITLE`              | `Summer Institute - Blender` |
    /// | `PROJECTS_ROOT`          | `./projects`                 |
    /// | `MAX_UPLOAD_BYTES`       | `1073741824`                 |
    /// | `SBATCH_PATH`            | `/bin/sbatch`                |
    /// | `SQUEUE_PATH`            | `/bin/squeue`                |
    /// | `SLURM_CLUSTER`          | `pitzer`                     |
    /// | `FRAME_SCRIPT`           | `./render_frames.sh`         |
    /// | `VIDEO_SCRIPT`           | `./render_video.sh`          |
    /// | `SCHEDULER_TIMEOUT_SECS` | `30`                         |
    ///
    /// The scheduler timeout is capped at half of `REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", "1073741824")
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let scheduler_timeout = scheduler_timeout_secs(
            env_or("SCHEDULER_TIMEOUT_SECS", "30")
                .parse()
                .expect("SCHEDULER_TIMEOUT_SECS must be a valid u64"),
            request_timeout_secs,
        );

        let slurm = SlurmConfig {
            sbatch_path: env_or("SBATCH_PATH", "/bin/sbatch"),
            squeue_path: env_or("SQUEUE_PATH", "/bin/squeue"),
            cluster: env_or("SLURM_CLUSTER", "pitzer"),
            frame_script: PathBuf::from(env_or("FRAME_SCRIPT", "./render_frames.sh")),
            video_script: PathBuf::from(env_or("VIDEO_SCRIPT", "./render_video.sh")),
            timeout: Duration::from_secs(scheduler_timeout),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_title: env_or("APP_TITLE", "Summer Institute - Blender"),
            projects_root: PathBuf::from(env_or("PROJECTS_ROOT", "./projects")),
            max_upload_bytes,
            slurm,
        }
    }
}

/// Cap the per-command scheduler timeout at half the request timeout.
///
/// A project view waits on one round of `squeue` calls; a hung scheduler
/// must time out before the request does.
fn scheduler_timeout_secs(requested: u64, request_timeout_secs: u64) -> u64 {
    let max = (request_timeout_secs / 2).max(1);
    if requested > max {
        tracing::warn!(
            requested,
            max,
            request_timeout_secs,
            "SCHEDULER_TIMEOUT_SECS too close to REQUEST_TIMEOUT_SECS, clamping"
        );
        return max;
    }
    requested.max(1)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}
