//! Error types for the gardenwatch relay
//!
//! This module defines the fetch and storage error types used throughout the application.

use thiserror::Error;

/// Errors that can occur while fetching upstream snapshots
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Non-success status code
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Response was not JSON
    #[error("Upstream returned non-JSON content ({content_type}): {preview}")]
    NotJson {
        content_type: String,
        preview: String,
    },

    /// JSON body did not have the expected shape
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Check if this error is likely to clear up on the next cycle
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::NotJson { .. } => true,
            Self::Malformed(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while reading or writing persisted files
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O failure on the given path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
