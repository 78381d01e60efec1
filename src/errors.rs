//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the congressional ingestion engine, providing
//! structured error types for every layer of the pipeline.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from HTTP transport, pagination, decoding,
//!   document retrieval, and configuration loading
//! - **Output**: Structured error types with endpoint/offset context
//! - **Error Categories**: Network, Pagination, Decoding, Document, Configuration
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic error conversion and chaining
//! - Recoverability classification for retry decisions
//! - Structured logging integration
//!
//! ## Usage
//! ```rust
//! use congress_ingest::errors::{Result, IngestError};
//!
//! fn fetch_operation() -> Result<Vec<String>> {
//!     Err(IngestError::Http {
//!         status: 503,
//!         endpoint: "bill".to_string(),
//!     })
//! }
//! ```

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for the congressional ingestion engine
#[derive(Debug, Error)]
pub enum IngestError {
    /// Persistent non-2xx response after the retry budget is exhausted
    #[error("HTTP {status} from endpoint '{endpoint}'")]
    Http { status: u16, endpoint: String },

    /// Transport-level failure (connection reset, timeout, incomplete body)
    #[error("Transport failure on '{endpoint}': {details}")]
    Transport { endpoint: String, details: String },

    /// A page fetch failed during a top-level pagination walk; fatal to the
    /// enclosing gather call
    #[error("Page fetch failed for '{endpoint}' at offset {offset}: {source}")]
    PageFetch {
        endpoint: String,
        offset: u64,
        #[source]
        source: Box<IngestError>,
    },

    /// A response body could not be decoded into its typed record
    #[error("Failed to decode {context}: {details}")]
    Decode { context: String, details: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Headless browser session failure during fallback download
    #[error("Browser download failed: {details}")]
    Browser { details: String },

    /// Local PDF parsing failure
    #[error("PDF parse failed: {details}")]
    Pdf { details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IngestError {
    /// Check if the error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            IngestError::Transport { .. } => true,
            IngestError::Http { status, .. } => matches!(status, 500 | 502 | 504),
            _ => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            IngestError::Http { .. } | IngestError::Transport { .. } => "network",
            IngestError::PageFetch { .. } => "pagination",
            IngestError::Decode { .. } | IngestError::Json(_) => "decoding",
            IngestError::Browser { .. } | IngestError::Pdf { .. } => "document",
            IngestError::Config { .. } | IngestError::Toml(_) => "configuration",
            IngestError::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::Transport {
            endpoint: err
                .url()
                .map(|u| u.path().to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(IngestError::Http {
            status: 502,
            endpoint: "bill".into()
        }
        .is_recoverable());
        assert!(!IngestError::Http {
            status: 404,
            endpoint: "bill".into()
        }
        .is_recoverable());
        assert!(IngestError::Transport {
            endpoint: "bill".into(),
            details: "connection reset".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_categories() {
        let err = IngestError::PageFetch {
            endpoint: "bill".into(),
            offset: 250,
            source: Box::new(IngestError::Http {
                status: 500,
                endpoint: "bill".into(),
            }),
        };
        assert_eq!(err.category(), "pagination");
    }
}
