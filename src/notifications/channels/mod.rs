//! Messaging platform channels
//!
//! A [`Messenger`] is the platform client the relay posts through. Sends are
//! never retried: an ambiguous failure could already have produced a message.

pub mod discord;
pub mod memory;

use async_trait::async_trait;

use crate::models::ChannelId;
use crate::notifications::{ChannelInfo, MessageContent, MessageHandle};

/// Result type for messenger operations
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Errors that can occur while talking to the messaging platform
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The channel or message does not exist (anymore)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform refused the request
    #[error("Rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Invalid messenger configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeliveryError {
    /// Check if the target no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Client for the messaging platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Messenger name, used in logs
    fn name(&self) -> &str;

    /// Look up a channel; `Ok(None)` if it does not exist
    async fn get_channel(&self, channel_id: ChannelId) -> DeliveryResult<Option<ChannelInfo>>;

    /// Post a new message
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> DeliveryResult<MessageHandle>;

    /// Replace the content of a posted message
    async fn edit(&self, handle: &MessageHandle, content: &MessageContent) -> DeliveryResult<()>;

    /// Check that a posted message still exists
    ///
    /// Returns `DeliveryError::NotFound` once the message was deleted.
    async fn fetch(&self, handle: &MessageHandle) -> DeliveryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::Rejected {
            status: 403,
            body: "Missing Access".to_string(),
        };
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("Missing Access"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(DeliveryError::NotFound("message 1".into()).is_not_found());
        assert!(!DeliveryError::RateLimited("slow down".into()).is_not_found());
    }
}
