//! Configuration management for sodagrid
//!
//! This module handles loading and validating configuration from environment
//! variables and files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fetcher configuration
    pub fetcher: FetcherConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fetcher-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Maximum number of concurrent detail-page requests
    pub max_concurrent_requests: usize,

    /// Rate limit (requests per second)
    pub rate_limit: f64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum retry attempts per request
    pub max_retries: u32,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the schedule document is written into
    pub output_dir: PathBuf,

    /// Include the "Generated ... from the official program" line
    pub include_source_link: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let max_concurrent_requests = std::env::var("SODAGRID_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let rate_limit = std::env::var("SODAGRID_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(5.0);

        let request_timeout_secs = std::env::var("SODAGRID_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let max_retries = std::env::var("SODAGRID_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let output_dir = std::env::var("SODAGRID_OUTPUT_DIR")
            .unwrap_or_else(|_| String::from("html"))
            .into();

        let include_source_link = std::env::var("SODAGRID_SOURCE_LINK")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let log_level =
            std::env::var("SODAGRID_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("SODAGRID_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            fetcher: FetcherConfig {
                max_concurrent_requests,
                rate_limit,
                request_timeout_secs,
                max_retries,
            },
            output: OutputConfig {
                output_dir,
                include_source_link,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be greater than 0");
        }

        if self.fetcher.rate_limit <= 0.0 {
            anyhow::bail!("rate_limit must be positive");
        }

        if self.fetcher.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetcher.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig {
                max_concurrent_requests: 10,
                rate_limit: 5.0,
                request_timeout_secs: 30,
                max_retries: 3,
            },
            output: OutputConfig {
                output_dir: PathBuf::from("html"),
                include_source_link: true,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
