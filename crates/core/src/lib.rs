//! Domain logic for the blendfarm render front-end.
//!
//! Everything here is free of HTTP concerns: the project directory store,
//! the per-project status file, job state translation, and the scheduler
//! interface with its Slurm subprocess adapter.

pub mod accounts;
pub mod error;
pub mod hashing;
pub mod job_state;
pub mod paths;
pub mod project;
pub mod scheduler;
pub mod status_file;
