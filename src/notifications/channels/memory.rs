//! In-memory messenger
//!
//! Used by `run --dry-run` and by tests. Every send and edit is logged and
//! recorded; messages can be deleted and failures injected to exercise the
//! relay's error paths.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::{DeliveryError, DeliveryResult, Messenger};
use crate::models::ChannelId;
use crate::notifications::{ChannelInfo, MessageContent, MessageHandle};

/// A message as last seen by the memory messenger
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub handle: MessageHandle,
    pub content: MessageContent,
    pub edits: usize,
}

#[derive(Default)]
struct Inner {
    messages: HashMap<MessageHandle, StoredMessage>,
    sent: Vec<MessageHandle>,
    missing_channels: HashSet<ChannelId>,
}

/// Messenger that keeps everything in memory
pub struct MemoryMessenger {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
    fetches: AtomicU64,
}

impl MemoryMessenger {
    /// Create an empty messenger
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_id: AtomicU64::new(1),
            fail_sends: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
            fetches: AtomicU64::new(0),
        }
    }

    /// Make every following send fail
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make every following edit fail (with a non-not-found error)
    pub fn set_fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Mark a channel as nonexistent
    pub fn remove_channel(&self, channel_id: ChannelId) {
        self.lock().missing_channels.insert(channel_id);
    }

    /// Delete a posted message, as a moderator would
    pub fn delete(&self, handle: &MessageHandle) -> bool {
        self.lock().messages.remove(handle).is_some()
    }

    /// Handles of all messages sent, in order
    pub fn sent(&self) -> Vec<MessageHandle> {
        self.lock().sent.clone()
    }

    /// Number of messages sent
    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Number of fetch calls made
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Current state of a message
    pub fn message(&self, handle: &MessageHandle) -> Option<StoredMessage> {
        self.lock().messages.get(handle).cloned()
    }

    /// Messages currently present in a channel
    pub fn messages_in(&self, channel_id: ChannelId) -> Vec<StoredMessage> {
        let inner = self.lock();
        inner
            .sent
            .iter()
            .filter(|h| h.channel_id == channel_id)
            .filter_map(|h| inner.messages.get(h).cloned())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_channel(&self, channel_id: ChannelId) -> DeliveryResult<Option<ChannelInfo>> {
        if self.lock().missing_channels.contains(&channel_id) {
            return Ok(None);
        }
        Ok(Some(ChannelInfo {
            id: channel_id,
            name: None,
        }))
    }

    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> DeliveryResult<MessageHandle> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                status: 500,
                body: "injected send failure".to_string(),
            });
        }

        let mut inner = self.lock();
        if inner.missing_channels.contains(&channel_id) {
            return Err(DeliveryError::NotFound(format!("channel {channel_id}")));
        }

        let handle = MessageHandle {
            channel_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        inner.messages.insert(
            handle,
            StoredMessage {
                handle,
                content: content.clone(),
                edits: 0,
            },
        );
        inner.sent.push(handle);

        tracing::info!(
            channel_id,
            message_id = handle.message_id,
            title = %content.title,
            "[dry-run] message sent"
        );
        Ok(handle)
    }

    async fn edit(&self, handle: &MessageHandle, content: &MessageContent) -> DeliveryResult<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                status: 500,
                body: "injected edit failure".to_string(),
            });
        }

        let mut inner = self.lock();
        let message = inner
            .messages
            .get_mut(handle)
            .ok_or_else(|| DeliveryError::NotFound(format!("message {handle}")))?;
        message.content = content.clone();
        message.edits += 1;

        tracing::debug!(handle = %handle, title = %content.title, "[dry-run] message edited");
        Ok(())
    }

    async fn fetch(&self, handle: &MessageHandle) -> DeliveryResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.lock().messages.contains_key(handle) {
            Ok(())
        } else {
            Err(DeliveryError::NotFound(format!("message {handle}")))
        }
    }
}
