//! Active event tracker
//!
//! In-memory cache of posted occurrences that are still inside their active
//! window. Each refresh tick re-renders tracked events with fresh countdowns
//! and edits their messages in place.
//!
//! # Lifecycle
//!
//! ```text
//! Posted ──▶ Refreshing ──┬──▶ Expired  (now >= end; removed, category re-checked)
//!               ▲   │     └──▶ Deleted  (message gone; removed, no re-check)
//!               └───┘
//! ```
//!
//! Losing the tracker (e.g. on restart) only stops countdown updates. Whether
//! an occurrence is ever sent again is decided by the baseline alone.

use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::detector::StockOccurrence;
use crate::metrics;
use crate::models::{Announcement, StockCategory, WeatherOccurrence};
use crate::notifications::{render, MessageContent, MessageHandle, Messenger};

// ============================================================================
// Tracked Events
// ============================================================================

/// Key of a tracked event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    Stock(StockCategory),
    Weather(String),
    Announcement(i64),
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stock(category) => write!(f, "stock:{category}"),
            Self::Weather(id) => write!(f, "weather:{id}"),
            Self::Announcement(ts) => write!(f, "announcement:{ts}"),
        }
    }
}

/// Inputs needed to re-render a tracked event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Stock(StockOccurrence),
    Weather(WeatherOccurrence),
    Announcement(Announcement),
}

/// Category to re-check after an event expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecheckTarget {
    Stock(StockCategory),
    Weather,
    Announcement,
}

impl std::fmt::Display for RecheckTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stock(category) => write!(f, "{category}"),
            Self::Weather => write!(f, "weather"),
            Self::Announcement => write!(f, "announcement"),
        }
    }
}

/// A posted occurrence kept up to date
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEvent {
    pub key: EventKey,
    pub handle: MessageHandle,
    pub payload: EventPayload,
}

impl ActiveEvent {
    pub fn stock(occurrence: StockOccurrence, handle: MessageHandle) -> Self {
        Self {
            key: EventKey::Stock(occurrence.category),
            handle,
            payload: EventPayload::Stock(occurrence),
        }
    }

    pub fn weather(weather: WeatherOccurrence, handle: MessageHandle) -> Self {
        Self {
            key: EventKey::Weather(weather.weather_id.clone().unwrap_or_default()),
            handle,
            payload: EventPayload::Weather(weather),
        }
    }

    pub fn announcement(announcement: Announcement, handle: MessageHandle) -> Self {
        Self {
            key: EventKey::Announcement(announcement.timestamp),
            handle,
            payload: EventPayload::Announcement(announcement),
        }
    }

    /// End of the active window; `None` means it never ends by time
    pub fn end_ts(&self) -> Option<i64> {
        match &self.payload {
            EventPayload::Stock(occurrence) => Some(occurrence.end_ts),
            EventPayload::Weather(weather) => weather.effective_end(),
            EventPayload::Announcement(announcement) => announcement.end(),
        }
    }

    /// Check if the window is over at `now`
    pub fn is_expired(&self, now: i64) -> bool {
        self.end_ts().is_some_and(|end| now >= end)
    }

    /// Render the current content
    pub fn render(&self, now: i64) -> MessageContent {
        match &self.payload {
            EventPayload::Stock(o) => {
                render::stock_message(o.category, &o.items, o.start_ts, o.end_ts, now)
            }
            EventPayload::Weather(w) => render::weather_message(w, now),
            EventPayload::Announcement(a) => render::announcement_message(a, now),
        }
    }

    /// Category to re-check once this event expires
    pub fn recheck_target(&self) -> RecheckTarget {
        match &self.key {
            EventKey::Stock(category) => RecheckTarget::Stock(*category),
            EventKey::Weather(_) => RecheckTarget::Weather,
            EventKey::Announcement(_) => RecheckTarget::Announcement,
        }
    }

    /// Metrics / log label of the event's category
    pub fn category_label(&self) -> &'static str {
        match &self.key {
            EventKey::Stock(category) => category.key(),
            EventKey::Weather(_) => "weather",
            EventKey::Announcement(_) => "announcement",
        }
    }
}

// ============================================================================
// Tracker
// ============================================================================

/// Outcome of one refresh pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Re-checks to run, one per expired event
    pub rechecks: Vec<RecheckTarget>,
    pub updated: usize,
    pub expired: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Mapping from event key to the live record
#[derive(Default)]
pub struct ActiveEventTracker {
    events: Mutex<HashMap<EventKey, ActiveEvent>>,
}

impl ActiveEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a posted event, replacing any previous one for the key
    pub async fn register(&self, event: ActiveEvent) -> Option<ActiveEvent> {
        let mut events = self.events.lock().await;
        let previous = events.insert(event.key.clone(), event);
        metrics::set_active_events(events.len());
        previous
    }

    /// Stop tracking a key
    pub async fn remove(&self, key: &EventKey) -> Option<ActiveEvent> {
        let mut events = self.events.lock().await;
        let removed = events.remove(key);
        metrics::set_active_events(events.len());
        removed
    }

    /// Look up a tracked event
    pub async fn get(&self, key: &EventKey) -> Option<ActiveEvent> {
        self.events.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    /// Clone of all tracked events
    pub async fn snapshot(&self) -> Vec<ActiveEvent> {
        self.events.lock().await.values().cloned().collect()
    }

    /// Remove `event` only if it is still the one registered for its key
    async fn retire(&self, event: &ActiveEvent) -> bool {
        let mut events = self.events.lock().await;
        let current = events
            .get(&event.key)
            .is_some_and(|tracked| tracked.handle == event.handle);
        if current {
            events.remove(&event.key);
            metrics::set_active_events(events.len());
        }
        current
    }

    /// Refresh every tracked event
    ///
    /// Expired events are removed without contacting the platform and yield a
    /// re-check target. Live events are fetched and edited in place; an event
    /// whose message is gone is dropped without a re-check. Any other failure
    /// keeps the event for the next tick.
    ///
    /// The lock is not held across platform calls, so events registered while
    /// a refresh is running are picked up on the next tick.
    pub async fn refresh(
        &self,
        messenger: &dyn Messenger,
        now: i64,
        decorate: impl Fn(MessageContent) -> MessageContent,
    ) -> RefreshReport {
        let mut report = RefreshReport::default();

        for event in self.snapshot().await {
            if event.is_expired(now) {
                if self.retire(&event).await {
                    tracing::info!(key = %event.key, "Tracked event expired");
                    metrics::record_tracked_removed("expired");
                    report.expired += 1;
                    report.rechecks.push(event.recheck_target());
                }
                continue;
            }

            let content = decorate(event.render(now));
            let result = match messenger.fetch(&event.handle).await {
                Ok(()) => messenger.edit(&event.handle, &content).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => report.updated += 1,
                Err(e) if e.is_not_found() => {
                    if self.retire(&event).await {
                        tracing::info!(key = %event.key, handle = %event.handle, "Tracked message deleted");
                        metrics::record_tracked_removed("deleted");
                        report.deleted += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(key = %event.key, error = %e, "Failed to refresh tracked event");
                    metrics::record_delivery_failure(event.category_label(), "edit");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::MemoryMessenger;
    use crate::models::StockItem;

    fn stock_event(handle: MessageHandle, end_ts: i64) -> ActiveEvent {
        ActiveEvent::stock(
            StockOccurrence {
                category: StockCategory::Seed,
                start_ts: 100,
                end_ts,
                items: vec![StockItem {
                    display_name: Some("Carrot".to_string()),
                    quantity: 3,
                    ..Default::default()
                }],
            },
            handle,
        )
    }

    async fn posted(messenger: &MemoryMessenger) -> MessageHandle {
        messenger
            .send(1, &MessageContent::new("placeholder", 0))
            .await
            .unwrap()
    }

    #[test]
    fn test_expiry_rules() {
        let handle = MessageHandle {
            channel_id: 1,
            message_id: 1,
        };
        let event = stock_event(handle, 1_000);
        assert!(!event.is_expired(999));
        assert!(event.is_expired(1_000));

        let endless = ActiveEvent::announcement(
            Announcement {
                message: Some("hi".to_string()),
                timestamp: 5,
                end_timestamp: None,
            },
            handle,
        );
        assert!(!endless.is_expired(i64::MAX));
        assert_eq!(endless.key, EventKey::Announcement(5));
        assert_eq!(endless.recheck_target(), RecheckTarget::Announcement);
    }

    #[tokio::test]
    async fn test_refresh_edits_live_events() {
        let messenger = MemoryMessenger::new();
        let tracker = ActiveEventTracker::new();
        let handle = posted(&messenger).await;
        tracker.register(stock_event(handle, 1_300)).await;

        let report = tracker.refresh(&messenger, 1_000, |c| c).await;
        assert_eq!(report.updated, 1);
        assert!(report.rechecks.is_empty());

        let stored = messenger.message(&handle).unwrap();
        assert_eq!(stored.content.title, "Seeds 🌱");
        assert_eq!(stored.content.field(render::FIELD_RESTOCKS_IN), Some("5m 0s"));
    }

    #[tokio::test]
    async fn test_refresh_expires_once() {
        let messenger = MemoryMessenger::new();
        let tracker = ActiveEventTracker::new();
        let handle = posted(&messenger).await;
        tracker.register(stock_event(handle, 999)).await;

        let report = tracker.refresh(&messenger, 1_000, |c| c).await;
        assert_eq!(report.rechecks, vec![RecheckTarget::Stock(StockCategory::Seed)]);
        assert_eq!(report.expired, 1);
        assert!(tracker.is_empty().await);
        // Expired events are retired without contacting the platform
        assert_eq!(messenger.fetch_count(), 0);

        let second = tracker.refresh(&messenger, 1_005, |c| c).await;
        assert!(second.rechecks.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_drops_deleted_without_recheck() {
        let messenger = MemoryMessenger::new();
        let tracker = ActiveEventTracker::new();
        let handle = posted(&messenger).await;
        tracker.register(stock_event(handle, 5_000)).await;
        messenger.delete(&handle);

        let report = tracker.refresh(&messenger, 1_000, |c| c).await;
        assert_eq!(report.deleted, 1);
        assert!(report.rechecks.is_empty());
        assert!(tracker.is_empty().await);
    }

    #[tokio::test]
    async fn test_refresh_keeps_event_on_other_errors() {
        let messenger = MemoryMessenger::new();
        let tracker = ActiveEventTracker::new();
        let handle = posted(&messenger).await;
        tracker.register(stock_event(handle, 5_000)).await;
        messenger.set_fail_edits(true);

        let report = tracker.refresh(&messenger, 1_000, |c| c).await;
        assert_eq!(report.failed, 1);
        assert_eq!(tracker.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_replaces_same_key() {
        let tracker = ActiveEventTracker::new();
        let first = MessageHandle {
            channel_id: 1,
            message_id: 1,
        };
        let second = MessageHandle {
            channel_id: 1,
            message_id: 2,
        };

        assert!(tracker.register(stock_event(first, 10)).await.is_none());
        let replaced = tracker.register(stock_event(second, 20)).await.unwrap();
        assert_eq!(replaced.handle, first);
        assert_eq!(tracker.len().await, 1);

        // A stale copy of the first event cannot retire the second
        assert!(!tracker.retire(&stock_event(first, 10)).await);
        assert_eq!(tracker.len().await, 1);
    }
}
