//! Shared constants

/// Path prefix for JSON API routes
pub const API_PREFIX: &str = "/api";

/// Path prefix under which stored files are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Base name used when a caller does not choose one
pub const DEFAULT_BASE_NAME: &str = "file";

/// Subdirectory used by the HTTP upload endpoint when none is configured
pub const DEFAULT_UPLOAD_SUBDIRECTORY: &str = "uploads";

/// Platform per-file upload limit when none is configured
pub const DEFAULT_UPLOAD_MAX_FILESIZE: &str = "2M";

/// Platform request-body limit when none is configured
pub const DEFAULT_POST_MAX_SIZE: &str = "8M";

/// Default API listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum number of requests the API serves concurrently
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Timeout for the storage check behind `/health`
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
