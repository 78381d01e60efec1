//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the ingestion engine, supporting TOML files
//! with environment variable overrides and validation. Configuration is read
//! once at process start and passed explicitly to component constructors;
//! nothing in the pipeline reads the environment after startup.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Required credentials, sane rate ceilings and timeouts
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use congress_ingest::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("API base: {}", config.api.base_url);
//! ```

use crate::errors::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API access settings
    pub api: ApiConfig,
    /// Request pacing settings
    pub pacing: PacingConfig,
    /// Document resolution settings
    pub resolver: ResolverConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote API access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL including version segment, e.g. `https://api.congress.gov/v3/`
    pub base_url: String,
    /// API key sent as the `x-api-key` header on every request
    pub api_key: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Items requested per page
    pub page_limit: u32,
    /// Retry attempts for transient server errors
    pub retry_attempts: u32,
    /// Base retry delay in milliseconds, doubled on each attempt
    pub retry_base_delay_ms: u64,
}

/// Request pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Account-wide request ceiling in requests per hour
    pub requests_per_hour: u32,
}

/// Document resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Scratch directory for browser-downloaded artifacts; a temp dir is
    /// created when unset
    pub scratch_dir: Option<PathBuf>,
    /// Fixed settle delay after browser navigation, waiting for the download
    /// to materialize
    pub download_settle_seconds: u64,
    /// Overall bound on one fallback browser session
    pub fallback_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| IngestError::Config {
                message: format!("Failed to read config file {:?}: {}", path, e),
            })?;
            toml::from_str(&content).map_err(|e| IngestError::Config {
                message: format!("Failed to parse config file {:?}: {}", path, e),
            })?
        } else {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CONGRESS_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(key) = std::env::var("CONGRESS_API_KEY") {
            self.api.api_key = key;
        }
        if let Ok(timeout) = std::env::var("CONGRESS_TIMEOUT_SECS") {
            self.api.timeout_seconds = timeout.parse().map_err(|_| IngestError::Config {
                message: "Invalid number in CONGRESS_TIMEOUT_SECS".to_string(),
            })?;
        }
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.api.api_key.is_empty() {
            return Err(IngestError::Config {
                message: "api.api_key is required (set CONGRESS_API_KEY)".to_string(),
            });
        }
        if self.api.base_url.is_empty() {
            return Err(IngestError::Config {
                message: "api.base_url is required (set CONGRESS_API_URL)".to_string(),
            });
        }
        if self.pacing.requests_per_hour == 0 {
            return Err(IngestError::Config {
                message: "pacing.requests_per_hour must be greater than zero".to_string(),
            });
        }
        if self.api.page_limit == 0 || self.api.page_limit > 250 {
            return Err(IngestError::Config {
                message: "api.page_limit must be between 1 and 250".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://api.congress.gov/v3/".to_string(),
                api_key: String::new(),
                timeout_seconds: 30,
                page_limit: 250,
                retry_attempts: 3,
                retry_base_delay_ms: 500,
            },
            pacing: PacingConfig {
                requests_per_hour: 5000,
            },
            resolver: ResolverConfig {
                scratch_dir: None,
                download_settle_seconds: 10,
                fallback_timeout_seconds: 90,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates_with_key() {
        let mut config = Config::default();
        config.api.api_key = "test-key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_limit_bounds() {
        let mut config = Config::default();
        config.api.api_key = "test-key".to_string();
        config.api.page_limit = 0;
        assert!(config.validate().is_err());
        config.api.page_limit = 251;
        assert!(config.validate().is_err());
        config.api.page_limit = 250;
        assert!(config.validate().is_ok());
    }
}
