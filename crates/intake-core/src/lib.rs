//! Intake Core Library
//!
//! This crate provides the configuration, error metadata, and size-limit parsing
//! shared by the storage pipeline, the HTTP API, and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod size;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IntakeConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use size::{parse_size, PlatformLimits};
