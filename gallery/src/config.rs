//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `GALLERY_CONFIG`
//! environment variable. A missing file is not an error: every field has a default, so the server
//! starts on port 3000 and stores uploads under `uploads/` with no configuration at all.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `GALLERY_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `GALLERY_STORAGE__DIR=/var/lib/gallery` sets the `storage.dir` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use gallery::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! GALLERY_PORT=8080
//! GALLERY_STORAGE__DIR=/srv/images
//! GALLERY_UPLOADS__MAX_GALLERY_FILES=20
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "GALLERY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Process-wide settings, built once at startup and handed to [`crate::Application::new`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Where uploaded files live and how they are exposed
    pub storage: StorageConfig,
    /// Limits applied to the upload endpoints
    pub uploads: UploadsConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageConfig::default(),
            uploads: UploadsConfig::default(),
            enable_otel_export: false,
        }
    }
}

/// Storage directory and public URL prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding stored files. Created at startup if missing.
    pub dir: PathBuf,
    /// URL prefix under which stored files are served (no trailing slash)
    pub url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            url_prefix: "/uploads".to_string(),
        }
    }
}

impl StorageConfig {
    /// Public URL of a stored file
    pub fn public_url(&self, stored_name: &str) -> String {
        format!("{}/{}", self.url_prefix, stored_name)
    }

    /// Storage directory resolved against the working directory
    pub fn resolved_dir(&self) -> PathBuf {
        std::path::absolute(&self.dir).unwrap_or_else(|_| self.dir.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Maximum number of files accepted by a single gallery upload
    pub max_gallery_files: usize,
    /// Maximum size of an upload request body, in bytes
    pub max_request_size: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_gallery_files: 10,
            max_request_size: 100 * 1024 * 1024, // 100 MiB
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.max_gallery_files == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_gallery_files must be at least 1".to_string(),
            });
        }

        if self.uploads.max_request_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_request_size must be greater than 0".to_string(),
            });
        }

        let prefix = &self.storage.url_prefix;
        if !prefix.starts_with('/') || prefix == "/" || prefix.ends_with('/') {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: storage.url_prefix '{prefix}' must start with '/', must not be '/' and must not end with '/'"
                ),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // GALLERY_CONFIG names the file itself, it is not a config key
            .merge(Env::prefixed("GALLERY_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
