//! Outbound messages for the relay
//!
//! This module holds the platform-neutral message model and the channels
//! that deliver it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │      Relay                                 │
//! │  - render occurrence -> MessageContent     │
//! │  - send / edit / fetch via Messenger       │
//! └────────────────────────────────────────────┘
//!                     │
//!             ┌───────┴───────┐
//!             ▼               ▼
//!       ┌──────────┐    ┌──────────┐
//!       │ Discord  │    │  Memory  │
//!       │  (REST)  │    │ (dry-run)│
//!       └──────────┘    └──────────┘
//! ```

pub mod channels;
pub mod render;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ChannelId;

// Re-exports
pub use channels::discord::{DiscordConfig, DiscordMessenger};
pub use channels::memory::MemoryMessenger;
pub use channels::{DeliveryError, DeliveryResult, Messenger};

/// Embed colours
pub mod colors {
    pub const STOCK: u32 = 0x2ECC71;
    pub const WEATHER: u32 = 0x3498DB;
    pub const ANNOUNCEMENT: u32 = 0xE67E22;
    pub const CALCULATOR: u32 = 0x9B59B6;
}

/// One name/value field of a rich message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// A link button attached below a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Rich content of one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub link_button: Option<LinkButton>,
}

impl MessageContent {
    /// Create content with a title and colour
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// Set the footer text
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Attach a link button
    pub fn with_link_button(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.link_button = Some(LinkButton {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    /// Look up a field value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Reference to a message posted on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: u64,
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.message_id)
    }
}

/// What the platform reports about a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: Option<String>,
}
