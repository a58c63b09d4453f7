//! Intake API Library
//!
//! HTTP front end for the upload pipeline: multipart decoding, staging, routing,
//! and error rendering. The binary in `main.rs` only loads configuration and
//! starts the server.

pub mod error;
mod handlers;
pub mod setup;
mod staging;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
