//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use intake_core::Config;
use std::sync::Arc;

/// Initialize the application: validate configuration, prepare directories, build routes
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::error::set_hide_error_details(config.is_production());

    tokio::fs::create_dir_all(config.upload_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir().display()
            )
        })?;
    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    tracing::info!(
        upload_dir = %config.upload_dir().display(),
        staging_dir = %config.staging_dir().display(),
        "Storage directories ready"
    );

    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
