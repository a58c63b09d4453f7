//! Route configuration and setup.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use intake_core::constants::{API_PREFIX, PUBLIC_PREFIX};
use intake_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, upload};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let body_limit = usize::try_from(config.platform_limits().post_limit()).unwrap_or(usize::MAX);
    let http_concurrency_limit = config.http_concurrency_limit();

    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit,
        "HTTP limits configured"
    );

    let api_routes = Router::new().route("/uploads", post(upload::upload_file));

    Router::new()
        .route("/health", get(health::health_check))
        .nest(API_PREFIX, api_routes)
        .with_state(state)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(config.upload_dir()))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}
