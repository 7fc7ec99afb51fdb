//! Unified error type for gardenwatch
//!
//! Each module keeps its own `thiserror` enum; this module folds them into a
//! single [`Error`] so commands can report a category and decide whether a
//! failure is worth retrying.

use thiserror::Error;

use crate::calculator::CalcError;
use crate::commands::BindError;
use crate::notifications::DeliveryError;
use crate::utils::error::{FetchError, StorageError};

/// Common behaviour for gardenwatch errors
pub trait GardenwatchErrorTrait: std::error::Error {
    /// Whether the operation may succeed if attempted again
    fn is_recoverable(&self) -> bool;

    /// Short human-readable description
    fn summary(&self) -> String {
        self.to_string()
    }

    fn category(&self) -> ErrorCategory;
}

/// Coarse grouping used in logs and command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Delivery,
    Storage,
    Config,
    Calculation,
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Delivery => "delivery",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Calculation => "calculation",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Calculation error: {0}")]
    Calc(#[from] CalcError),

    #[error("Command error: {0}")]
    Bind(#[from] BindError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl GardenwatchErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Delivery(e) => matches!(
                e,
                DeliveryError::Http(_) | DeliveryError::RateLimited(_)
            ),
            Self::Storage(_) | Self::Io(_) => true,
            Self::Calc(_) | Self::Bind(_) => false,
            Self::Config(_) | Self::Json(_) | Self::Toml(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Delivery(DeliveryError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Delivery(_) => ErrorCategory::Delivery,
            Self::Storage(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Calc(_) => ErrorCategory::Calculation,
            Self::Bind(_) | Self::Other { .. } => ErrorCategory::Other,
            Self::Config(_) | Self::Toml(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::Fetch(FetchError::Timeout);
        assert_eq!(err.category(), ErrorCategory::Network);

        let err = Error::Delivery(DeliveryError::NotFound("channel 1".into()));
        assert_eq!(err.category(), ErrorCategory::Delivery);

        let err = Error::Delivery(DeliveryError::InvalidConfig("empty token".into()));
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Fetch(FetchError::Timeout).is_recoverable());
        assert!(Error::Delivery(DeliveryError::RateLimited("slow down".into())).is_recoverable());
        assert!(!Error::Delivery(DeliveryError::NotFound("x".into())).is_recoverable());
        assert!(!Error::Calc(CalcError::UnknownItem("durian".into())).is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = BindError::PermissionDenied.into();
        assert!(matches!(unified, Error::Bind(_)));
        assert_eq!(unified.category(), ErrorCategory::Other);
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing stock url");
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
        assert_eq!(err.summary(), "Configuration error: missing stock url");
    }

    #[test]
    fn test_other_error() {
        let err = Error::with_source("wrapped", std::io::Error::other("inner"));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(ErrorCategory::Calculation.to_string(), "calculation");
    }
}
