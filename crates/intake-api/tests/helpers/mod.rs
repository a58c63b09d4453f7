//! Test helpers: build configuration, state, and router for integration tests.
//!
//! Every test app gets its own temporary upload and staging directories.

#![allow(dead_code)]

use axum::body::Bytes;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use intake_api::setup::initialize_app;
use intake_core::{Config, IntakeConfig};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

/// Test application: server plus the directories it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files left in the staging directory
    pub fn staged_file_count(&self) -> usize {
        count_files(self.staging_dir.path())
    }

    pub fn stored_path(&self, relative_path: &str) -> std::path::PathBuf {
        self.upload_dir.path().join(relative_path)
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

/// Build a test app; `overrides` are applied on top of the test defaults.
pub async fn setup_test_app(overrides: &[(&str, &str)]) -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    let staging_dir = TempDir::new().expect("Failed to create staging dir");

    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "UPLOAD_DIR".to_string(),
        upload_dir.path().display().to_string(),
    );
    vars.insert(
        "STAGING_DIR".to_string(),
        staging_dir.path().display().to_string(),
    );
    vars.insert("UPLOAD_SUBDIRECTORY".to_string(), "avatars".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let config = IntakeConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test config");
    let (_state, app) = initialize_app(Config(Box::new(config)))
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        staging_dir,
    }
}

/// Multipart form with a single file part
pub fn file_form(contents: &[u8], file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::copy_from_slice(contents))
        .file_name(file_name)
        .mime_type(mime_type);
    MultipartForm::new().add_part("file", part)
}

/// Minimal PNG signature plus padding
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len.max(data.len()), 0);
    data
}
