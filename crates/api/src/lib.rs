//! blendfarm API server library.
//!
//! Exposes the building blocks (config, state, error handling, flash
//! messages, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod config;
pub mod error;
pub mod extract;
pub mod flash;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
