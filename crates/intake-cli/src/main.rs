//! Intake CLI: store local files through the upload pipeline.
//!
//! Reads the same environment as the API (UPLOAD_DIR, STAGING_DIR, size limits).

use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_cli::{ingest_file, init_tracing, limits_report, IngestOptions};
use intake_core::Config;
use intake_storage::StorageRoot;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "intake", about = "Validate and store files under the upload root")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a local file (the source file is left in place)
    Ingest {
        /// Path to the file to store
        file: PathBuf,
        /// Base name for the generated file name
        #[arg(long)]
        name: Option<String>,
        /// Extension to use instead of the one in the file name
        #[arg(long = "ext")]
        extension: Option<String>,
        /// Declared MIME type
        #[arg(long = "mime")]
        mime_type: Option<String>,
        /// Subdirectory under the upload root (defaults to UPLOAD_SUBDIRECTORY)
        #[arg(long = "subdir")]
        subdirectory: Option<String>,
        /// Size limit in bytes; 0 uses the default limit
        #[arg(long = "max-size")]
        max_size: Option<u64>,
        /// Allowed MIME type; repeat for several (defaults to ALLOWED_CONTENT_TYPES)
        #[arg(long = "allow")]
        allow: Vec<String>,
    },
    /// Show the configured size limits
    Limits,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Load configuration")?;
    let root = Arc::new(StorageRoot::from_config(&config));

    match cli.command {
        Commands::Ingest {
            file,
            name,
            extension,
            mime_type,
            subdirectory,
            max_size,
            allow,
        } => {
            let allowed_mime_types = if allow.is_empty() {
                config.allowed_content_types().to_vec()
            } else {
                allow
            };
            let options = IngestOptions {
                file,
                name,
                extension,
                mime_type,
                subdirectory: subdirectory
                    .unwrap_or_else(|| config.upload_subdirectory().to_string()),
                max_file_size_bytes: max_size.unwrap_or_else(|| config.max_file_size_bytes()),
                allowed_mime_types,
            };
            let report = ingest_file(root, config.staging_dir(), options).await?;
            print_json(&report)?;
        }
        Commands::Limits => {
            print_json(&limits_report(&root))?;
        }
    }

    Ok(())
}
