//! Configuration module
//!
//! Configuration is read from environment variables (a `.env` file is loaded first
//! when present). It is built once at startup and passed explicitly to whatever
//! needs it; nothing reads process-wide state after that.

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::constants::{
    DEFAULT_HTTP_CONCURRENCY_LIMIT, DEFAULT_PORT, DEFAULT_POST_MAX_SIZE,
    DEFAULT_UPLOAD_MAX_FILESIZE, DEFAULT_UPLOAD_SUBDIRECTORY, PUBLIC_PREFIX,
};
use crate::size::{parse_size, PlatformLimits};

/// Base configuration shared by the API and CLI
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
}

/// Upload pipeline configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub base: BaseConfig,
    // Storage root
    pub upload_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub max_upload_size: Option<u64>,
    pub platform_limits: PlatformLimits,
    // HTTP upload endpoint
    pub upload_subdirectory: String,
    pub allowed_content_types: Vec<String>,
    pub max_file_size_bytes: u64,
    pub public_base_url: String,
    pub http_concurrency_limit: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IntakeConfig>);

impl Config {
    fn as_intake(&self) -> &IntakeConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IntakeConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_intake().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_intake().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_intake().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_intake().base.environment
    }

    pub fn upload_dir(&self) -> &Path {
        &self.as_intake().upload_dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.as_intake().staging_dir
    }

    pub fn max_upload_size(&self) -> Option<u64> {
        self.as_intake().max_upload_size
    }

    pub fn platform_limits(&self) -> &PlatformLimits {
        &self.as_intake().platform_limits
    }

    pub fn upload_subdirectory(&self) -> &str {
        &self.as_intake().upload_subdirectory
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_intake().allowed_content_types
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.as_intake().max_file_size_bytes
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_intake().public_base_url
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_intake().http_concurrency_limit
    }
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let upload_dir = lookup("UPLOAD_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("UPLOAD_DIR must be set to the storage root"))?;

        let staging_dir = lookup("STAGING_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("intake-staging"));

        let max_upload_size = lookup("MAX_UPLOAD_SIZE")
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_size(&s));

        let platform_limits = PlatformLimits::new(
            lookup("UPLOAD_MAX_FILESIZE").unwrap_or_else(|| DEFAULT_UPLOAD_MAX_FILESIZE.to_string()),
            lookup("POST_MAX_SIZE").unwrap_or_else(|| DEFAULT_POST_MAX_SIZE.to_string()),
        );

        let upload_subdirectory = lookup("UPLOAD_SUBDIRECTORY")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_UPLOAD_SUBDIRECTORY.to_string());

        // Exact strings: the declared MIME type is matched verbatim
        let allowed_content_types = lookup("ALLOWED_CONTENT_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_bytes = match lookup("MAX_FILE_SIZE_BYTES") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be a byte count"))?,
            None => 0,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}{}", server_port, PUBLIC_PREFIX));

        let http_concurrency_limit = lookup("HTTP_CONCURRENCY_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
            .max(1);

        let config = IntakeConfig {
            base: BaseConfig {
                server_port,
                environment,
            },
            upload_dir,
            staging_dir,
            max_upload_size,
            platform_limits,
            upload_subdirectory,
            allowed_content_types,
            max_file_size_bytes,
            public_base_url,
            http_concurrency_limit,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIR must not be empty"));
        }

        let subdirectory_is_relative = Path::new(&self.upload_subdirectory)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !subdirectory_is_relative {
            return Err(anyhow::anyhow!(
                "UPLOAD_SUBDIRECTORY must be a relative path without '..' segments"
            ));
        }

        if !self.public_base_url.starts_with("http://")
            && !self.public_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must start with http:// or https://"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IntakeConfig::from_lookup(lookup_from(&[("UPLOAD_DIR", "/srv/uploads")]))
            .unwrap();
        assert_eq!(config.base.server_port, DEFAULT_PORT);
        assert_eq!(config.base.environment, "development");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.max_upload_size, None);
        assert_eq!(config.platform_limits, PlatformLimits::default());
        assert_eq!(config.upload_subdirectory, "uploads");
        assert!(config.allowed_content_types.is_empty());
        assert_eq!(config.max_file_size_bytes, 0);
        assert_eq!(config.public_base_url, "http://localhost:8080/uploads");
        assert_eq!(config.http_concurrency_limit, DEFAULT_HTTP_CONCURRENCY_LIMIT);
    }

    #[test]
    fn test_upload_dir_required() {
        let err = IntakeConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("UPLOAD_DIR"));
    }

    #[test]
    fn test_overrides() {
        let config = IntakeConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/srv/uploads"),
            ("PORT", "9000"),
            ("MAX_UPLOAD_SIZE", "5M"),
            ("UPLOAD_MAX_FILESIZE", "64M"),
            ("POST_MAX_SIZE", "1G"),
            ("UPLOAD_SUBDIRECTORY", "avatars/"),
            ("ALLOWED_CONTENT_TYPES", "image/png, image/jpeg,,"),
            ("MAX_FILE_SIZE_BYTES", "1000000"),
        ]))
        .unwrap();
        assert_eq!(config.base.server_port, 9000);
        assert_eq!(config.max_upload_size, Some(5 * 1024 * 1024));
        assert_eq!(config.platform_limits.upload_max_filesize, "64M");
        assert_eq!(config.platform_limits.post_max_size, "1G");
        assert_eq!(config.upload_subdirectory, "avatars");
        assert_eq!(config.allowed_content_types, vec!["image/png", "image/jpeg"]);
        assert_eq!(config.max_file_size_bytes, 1_000_000);
        assert_eq!(config.public_base_url, "http://localhost:9000/uploads");
    }

    #[test]
    fn test_rejects_traversing_subdirectory() {
        let err = IntakeConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/srv/uploads"),
            ("UPLOAD_SUBDIRECTORY", "../etc"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("UPLOAD_SUBDIRECTORY"));
    }

    #[test]
    fn test_rejects_absolute_subdirectory() {
        let err = IntakeConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/srv/uploads"),
            ("UPLOAD_SUBDIRECTORY", "/etc"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("UPLOAD_SUBDIRECTORY"));
    }

    #[test]
    fn test_rejects_invalid_port() {
        let err = IntakeConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/srv/uploads"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_rejects_non_http_public_url() {
        let err = IntakeConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/srv/uploads"),
            ("PUBLIC_BASE_URL", "ftp://files.example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PUBLIC_BASE_URL"));
    }

    #[test]
    fn test_production_detection() {
        let config = Config(Box::new(
            IntakeConfig::from_lookup(lookup_from(&[
                ("UPLOAD_DIR", "/srv/uploads"),
                ("APP_ENV", "Prod"),
            ]))
            .unwrap(),
        ));
        assert!(config.is_production());
    }
}
