//! Discord REST messenger
//!
//! Talks to the Discord HTTP API (v10) with a bot token. Messages carry one
//! embed and, when configured, an action row holding a single link button.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::{DeliveryError, DeliveryResult, Messenger};
use crate::models::ChannelId;
use crate::notifications::{ChannelInfo, MessageContent, MessageHandle};

/// Discord client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token (without the `Bot ` prefix)
    #[serde(default)]
    pub token: String,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl DiscordConfig {
    /// Create a configuration for a bot token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: default_api_base(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.token.trim().is_empty() {
            return Err("Discord bot token cannot be empty".to_string());
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err("Discord API base must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Discord messenger
///
/// # Example
///
/// ```rust,ignore
/// use gardenwatch::notifications::{DiscordConfig, DiscordMessenger, MessageContent};
///
/// let messenger = DiscordMessenger::new(DiscordConfig::new(token))?;
/// let handle = messenger.send(channel_id, &MessageContent::new("Hello", 0)).await?;
/// ```
pub struct DiscordMessenger {
    config: DiscordConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl DiscordMessenger {
    /// Create a new Discord messenger
    pub fn new(config: DiscordConfig) -> DeliveryResult<Self> {
        config.validate().map_err(DeliveryError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// API base URL in use
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("Bot {}", self.config.token),
        )
    }

    /// Build the request body for a message
    fn build_payload(content: &MessageContent) -> Value {
        let mut embed = json!({
            "title": content.title,
            "color": content.color,
            "fields": content.fields,
        });
        if let Some(description) = &content.description {
            embed["description"] = json!(description);
        }
        if let Some(footer) = &content.footer {
            embed["footer"] = json!({ "text": footer });
        }

        let components = match &content.link_button {
            Some(button) => json!([{
                "type": 1,
                "components": [{
                    "type": 2,
                    "style": 5,
                    "label": button.label,
                    "url": button.url,
                }]
            }]),
            None => json!([]),
        };

        json!({
            "embeds": [embed],
            "components": components,
        })
    }

    /// Map a non-success response to a delivery error
    async fn check(response: Response, what: &str) -> DeliveryResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        Err(match status {
            StatusCode::NOT_FOUND => DeliveryError::NotFound(what.to_string()),
            StatusCode::TOO_MANY_REQUESTS => DeliveryError::RateLimited(body),
            _ => DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            },
        })
    }

    fn parse_id(raw: &str) -> DeliveryResult<u64> {
        raw.parse::<u64>().map_err(|_| DeliveryError::Rejected {
            status: 200,
            body: format!("unexpected id {raw:?}"),
        })
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    fn name(&self) -> &str {
        "discord"
    }

    async fn get_channel(&self, channel_id: ChannelId) -> DeliveryResult<Option<ChannelInfo>> {
        let request = self.authorized(self.client.get(self.url(&format!("/channels/{channel_id}"))));
        let response = request.send().await?;

        match Self::check(response, &format!("channel {channel_id}")).await {
            Ok(response) => {
                let body: IdResponse = response.json().await?;
                Ok(Some(ChannelInfo {
                    id: Self::parse_id(&body.id)?,
                    name: body.name,
                }))
            }
            Err(DeliveryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> DeliveryResult<MessageHandle> {
        let payload = Self::build_payload(content);
        let request = self.authorized(
            self.client
                .post(self.url(&format!("/channels/{channel_id}/messages")))
                .json(&payload),
        );

        let response = Self::check(request.send().await?, &format!("channel {channel_id}")).await?;
        let body: IdResponse = response.json().await?;
        let handle = MessageHandle {
            channel_id,
            message_id: Self::parse_id(&body.id)?,
        };

        tracing::debug!(handle = %handle, title = %content.title, "Discord message sent");
        Ok(handle)
    }

    async fn edit(&self, handle: &MessageHandle, content: &MessageContent) -> DeliveryResult<()> {
        let payload = Self::build_payload(content);
        let request = self.authorized(
            self.client
                .patch(self.url(&format!(
                    "/channels/{}/messages/{}",
                    handle.channel_id, handle.message_id
                )))
                .json(&payload),
        );

        Self::check(request.send().await?, &format!("message {handle}")).await?;
        Ok(())
    }

    async fn fetch(&self, handle: &MessageHandle) -> DeliveryResult<()> {
        let request = self.authorized(self.client.get(self.url(&format!(
            "/channels/{}/messages/{}",
            handle.channel_id, handle.message_id
        ))));

        Self::check(request.send().await?, &format!("message {handle}")).await?;
        Ok(())
    }
}
