//! Relay context and per-category checks
//!
//! [`Relay`] owns everything one running instance needs: channel bindings,
//! the baseline (through the detector), the active event tracker, the
//! upstream source and the messenger. It is created once, shared behind an
//! `Arc` by the scheduler drivers, and flushed on shutdown.
//!
//! Every check follows the same path:
//!
//! ```text
//! bound? ─▶ fetch ─▶ detect (reserve marker) ─▶ render ─▶ send ─▶ track
//! ```
//!
//! A fetch failure aborts the check for this cycle and leaves the baseline
//! untouched. A delivery failure after reservation is logged and the
//! occurrence is considered consumed.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::detector::{Novelty, NoveltyDetector, StockOccurrence};
use crate::fetcher::SnapshotSource;
use crate::metrics;
use crate::models::{Announcement, Category, ChannelId, StockCategory, StockSnapshot};
use crate::notifications::{
    render, DeliveryError, MessageContent, MessageHandle, Messenger,
};
use crate::storage::baseline::BaselineStore;
use crate::storage::bindings::ChannelBindings;
use crate::tracker::{ActiveEvent, ActiveEventTracker, RecheckTarget};
use crate::utils::error::{FetchError, StorageError};
use crate::utils::now_unix;

/// Label of the invite button
const INVITE_LABEL: &str = "Invite the bot";

// ============================================================================
// Outcomes
// ============================================================================

/// Why a weather check runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Periodic driver
    Scheduled,
    /// Startup pass; same logic, logged differently
    Restart,
}

/// Result of one category check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No channel bound; nothing fetched, baseline untouched
    Unbound,
    /// Nothing new
    NoNovelty,
    /// At least one new occurrence was reserved
    Delivered { posted: usize, failed: usize },
}

impl CheckOutcome {
    fn from_counts(posted: usize, failed: usize) -> Self {
        if posted == 0 && failed == 0 {
            Self::NoNovelty
        } else {
            Self::Delivered { posted, failed }
        }
    }

    /// Number of occurrences posted
    pub fn posted(&self) -> usize {
        match self {
            Self::Delivered { posted, .. } => *posted,
            _ => 0,
        }
    }
}

/// Summary of a multi-category cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub posted: usize,
    pub failed: usize,
    pub fetch_errors: usize,
}

impl CycleReport {
    /// Fold one check result into the report; fetch errors are logged here
    pub fn absorb(&mut self, source: &str, result: Result<CheckOutcome, FetchError>) {
        match result {
            Ok(CheckOutcome::Delivered { posted, failed }) => {
                self.posted += posted;
                self.failed += failed;
            }
            Ok(_) => {}
            Err(e) => {
                log_fetch_error(source, &e);
                self.fetch_errors += 1;
            }
        }
    }
}

fn log_fetch_error(source: &str, error: &FetchError) {
    tracing::warn!(
        source,
        error = %error,
        recoverable = error.is_recoverable(),
        "Fetch failed, skipping this cycle"
    );
    metrics::record_fetch_error(source);
}

/// Failure between reservation and a tracked message
#[derive(Debug, thiserror::Error)]
enum PostError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

// ============================================================================
// Relay
// ============================================================================

/// Process-scoped relay context
pub struct Relay {
    bindings: RwLock<ChannelBindings>,
    bindings_path: Option<PathBuf>,
    detector: NoveltyDetector,
    tracker: ActiveEventTracker,
    source: Arc<dyn SnapshotSource>,
    messenger: Arc<dyn Messenger>,
    invite_url: Option<String>,
}

impl Relay {
    /// Create a relay
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        messenger: Arc<dyn Messenger>,
        baseline: Arc<BaselineStore>,
        bindings: ChannelBindings,
    ) -> Self {
        Self {
            bindings: RwLock::new(bindings),
            bindings_path: None,
            detector: NoveltyDetector::new(baseline),
            tracker: ActiveEventTracker::new(),
            source,
            messenger,
            invite_url: None,
        }
    }

    /// Attach an invite link button to every message
    pub fn with_invite_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.invite_url = (!url.trim().is_empty()).then_some(url);
        self
    }

    /// Reload bindings from this file on [`Relay::reload_bindings`]
    pub fn with_bindings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bindings_path = Some(path.into());
        self
    }

    pub fn baseline(&self) -> &Arc<BaselineStore> {
        self.detector.baseline()
    }

    pub fn tracker(&self) -> &ActiveEventTracker {
        &self.tracker
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }

    /// Channel bound to a category
    pub async fn channel_for(&self, category: Category) -> Option<ChannelId> {
        self.bindings.read().await.get(category)
    }

    /// Replace the bindings
    pub async fn set_bindings(&self, bindings: ChannelBindings) {
        *self.bindings.write().await = bindings;
    }

    /// Re-read the bindings file, keeping the current bindings on error
    pub async fn reload_bindings(&self) {
        let Some(path) = &self.bindings_path else {
            return;
        };

        match ChannelBindings::load(path) {
            Ok(loaded) => {
                let mut current = self.bindings.write().await;
                if *current != loaded {
                    tracing::info!(bound = loaded.len(), "Channel bindings changed");
                    *current = loaded;
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to reload channel bindings");
            }
        }
    }

    /// Apply the invite button, if configured
    pub fn decorate(&self, content: MessageContent) -> MessageContent {
        match &self.invite_url {
            Some(url) => content.with_link_button(INVITE_LABEL, url),
            None => content,
        }
    }

    // ------------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------------

    /// Check one stock category
    pub async fn check_stock_category(
        &self,
        category: StockCategory,
    ) -> Result<CheckOutcome, FetchError> {
        let Some(channel) = self.channel_for(Category::Stock(category)).await else {
            return Ok(CheckOutcome::Unbound);
        };

        let snapshot = self.source.fetch_stock().await?;
        Ok(self.process_stock(category, &snapshot, channel).await)
    }

    /// Check every weather entry
    pub async fn check_weather(&self, mode: CheckMode) -> Result<CheckOutcome, FetchError> {
        let Some(channel) = self.channel_for(Category::Weather).await else {
            return Ok(CheckOutcome::Unbound);
        };

        let entries = self.source.fetch_weather().await?;
        tracing::debug!(entries = entries.len(), ?mode, "Checking weather");

        let (mut posted, mut failed) = (0, 0);
        for weather in &entries {
            let novelty = match self.detector.detect_weather(weather, now_unix()).await {
                Ok(novelty) => novelty,
                Err(e) => {
                    tracing::error!(weather_id = ?weather.weather_id, error = %e, "Failed to reserve weather marker");
                    failed += 1;
                    continue;
                }
            };

            let Novelty::New(weather) = novelty else {
                continue;
            };

            let content = render::weather_message(&weather, now_unix());
            match self.post(Category::Weather, channel, content).await {
                Ok(handle) => {
                    tracing::info!(
                        weather_id = ?weather.weather_id,
                        name = weather.name(),
                        channel_id = channel,
                        restart = mode == CheckMode::Restart,
                        "Posted weather event"
                    );
                    self.tracker.register(ActiveEvent::weather(weather, handle)).await;
                    posted += 1;
                }
                Err(_) => failed += 1,
            }
        }

        let outcome = CheckOutcome::from_counts(posted, failed);
        if outcome == CheckOutcome::NoNovelty {
            metrics::record_stale("weather");
        }
        Ok(outcome)
    }

    /// Check the current announcement
    pub async fn check_announcements(&self) -> Result<CheckOutcome, FetchError> {
        let Some(channel) = self.channel_for(Category::Announcement).await else {
            return Ok(CheckOutcome::Unbound);
        };

        let snapshot = self.source.fetch_stock().await?;
        Ok(self.process_announcement(snapshot.announcement.as_ref(), channel).await)
    }

    /// Weather and announcements
    pub async fn fast_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        report.absorb("weather", self.check_weather(CheckMode::Scheduled).await);
        report.absorb("stock", self.check_announcements().await);
        report
    }

    /// Weather, announcements and all stock categories
    ///
    /// The stock endpoint is fetched once and shared by all five stock
    /// categories and the announcement.
    pub async fn full_sweep(&self) -> CycleReport {
        let mut report = CycleReport::default();
        report.absorb("weather", self.check_weather(CheckMode::Scheduled).await);

        let mut targets = Vec::new();
        for category in StockCategory::all() {
            if let Some(channel) = self.channel_for(Category::Stock(category)).await {
                targets.push((category, channel));
            }
        }
        let announcement_channel = self.channel_for(Category::Announcement).await;

        if targets.is_empty() && announcement_channel.is_none() {
            return report;
        }

        let snapshot = match self.source.fetch_stock().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                report.absorb("stock", Err(e));
                return report;
            }
        };

        for (category, channel) in targets {
            let outcome = self.process_stock(category, &snapshot, channel).await;
            report.absorb("stock", Ok(outcome));
        }

        if let Some(channel) = announcement_channel {
            let outcome = self
                .process_announcement(snapshot.announcement.as_ref(), channel)
                .await;
            report.absorb("stock", Ok(outcome));
        }

        report
    }

    /// Refresh tracked events, returning the re-checks to run
    pub async fn refresh_tick(&self, now: i64) -> Vec<RecheckTarget> {
        let report = self
            .tracker
            .refresh(self.messenger.as_ref(), now, |content| self.decorate(content))
            .await;

        if report.expired + report.deleted + report.failed > 0 {
            tracing::debug!(
                updated = report.updated,
                expired = report.expired,
                deleted = report.deleted,
                failed = report.failed,
                "Refresh tick"
            );
        }

        report.rechecks
    }

    /// Re-check the category of an expired event
    pub async fn recheck(&self, target: RecheckTarget) -> Result<CheckOutcome, FetchError> {
        tracing::debug!(recheck = %target, "Re-checking after expiry");
        match target {
            RecheckTarget::Stock(category) => self.check_stock_category(category).await,
            RecheckTarget::Weather => self.check_weather(CheckMode::Scheduled).await,
            RecheckTarget::Announcement => self.check_announcements().await,
        }
    }

    // ------------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------------

    async fn process_stock(
        &self,
        category: StockCategory,
        snapshot: &StockSnapshot,
        channel: ChannelId,
    ) -> CheckOutcome {
        let result = self.reserve_and_post_stock(category, snapshot, channel).await;

        match result {
            Ok(Some((occurrence, handle))) => {
                tracing::info!(
                    category = %category,
                    start_ts = occurrence.start_ts,
                    end_ts = occurrence.end_ts,
                    channel_id = channel,
                    "Posted new stock"
                );
                self.tracker.register(ActiveEvent::stock(occurrence, handle)).await;
                CheckOutcome::Delivered { posted: 1, failed: 0 }
            }
            Ok(None) => {
                metrics::record_stale(category.key());
                CheckOutcome::NoNovelty
            }
            Err(PostError::Storage(e)) => {
                tracing::error!(category = %category, error = %e, "Failed to reserve stock marker");
                CheckOutcome::Delivered { posted: 0, failed: 1 }
            }
            Err(PostError::Delivery(_)) => CheckOutcome::Delivered { posted: 0, failed: 1 },
        }
    }

    async fn reserve_and_post_stock(
        &self,
        category: StockCategory,
        snapshot: &StockSnapshot,
        channel: ChannelId,
    ) -> Result<Option<(StockOccurrence, MessageHandle)>, PostError> {
        let novelty = self
            .detector
            .detect_stock(category, snapshot.items(category))
            .await?;
        let Novelty::New(occurrence) = novelty else {
            return Ok(None);
        };

        let content = render::stock_message(
            category,
            &occurrence.items,
            occurrence.start_ts,
            occurrence.end_ts,
            now_unix(),
        );
        let handle = self
            .post(Category::Stock(category), channel, content)
            .await?;
        Ok(Some((occurrence, handle)))
    }

    async fn process_announcement(
        &self,
        announcement: Option<&Announcement>,
        channel: ChannelId,
    ) -> CheckOutcome {
        let Some(announcement) = announcement else {
            metrics::record_stale("announcement");
            return CheckOutcome::NoNovelty;
        };

        let novelty = match self.detector.detect_announcement(announcement).await {
            Ok(novelty) => novelty,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reserve announcement marker");
                return CheckOutcome::Delivered { posted: 0, failed: 1 };
            }
        };

        let Novelty::New(announcement) = novelty else {
            metrics::record_stale("announcement");
            return CheckOutcome::NoNovelty;
        };

        let content = render::announcement_message(&announcement, now_unix());
        match self.post(Category::Announcement, channel, content).await {
            Ok(handle) => {
                tracing::info!(
                    timestamp = announcement.timestamp,
                    channel_id = channel,
                    "Posted new announcement"
                );
                self.tracker
                    .register(ActiveEvent::announcement(announcement, handle))
                    .await;
                CheckOutcome::Delivered { posted: 1, failed: 0 }
            }
            Err(_) => CheckOutcome::Delivered { posted: 0, failed: 1 },
        }
    }

    /// Send rendered content to a bound channel
    ///
    /// Failures are logged here; the reserved marker stays advanced.
    async fn post(
        &self,
        category: Category,
        channel: ChannelId,
        content: MessageContent,
    ) -> Result<MessageHandle, DeliveryError> {
        let content = self.decorate(content);

        let result = self.send_to_channel(channel, &content).await;

        match &result {
            Ok(_) => metrics::record_posted(category.key()),
            Err(e) => {
                tracing::error!(
                    category = %category,
                    channel_id = channel,
                    error = %e,
                    "Delivery failed; occurrence will not be retried"
                );
                metrics::record_delivery_failure(category.key(), "send");
            }
        }

        result
    }

    async fn send_to_channel(
        &self,
        channel: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageHandle, DeliveryError> {
        if self.messenger.get_channel(channel).await?.is_none() {
            return Err(DeliveryError::NotFound(format!("channel {channel}")));
        }
        self.messenger.send(channel, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_counts() {
        assert_eq!(CheckOutcome::from_counts(0, 0), CheckOutcome::NoNovelty);
        assert_eq!(
            CheckOutcome::from_counts(2, 1),
            CheckOutcome::Delivered { posted: 2, failed: 1 }
        );
        assert_eq!(CheckOutcome::Unbound.posted(), 0);
    }

    #[test]
    fn test_cycle_report_absorb() {
        let mut report = CycleReport::default();
        report.absorb("stock", Ok(CheckOutcome::Delivered { posted: 1, failed: 0 }));
        report.absorb("stock", Ok(CheckOutcome::NoNovelty));
        report.absorb("weather", Err(FetchError::Timeout));

        assert_eq!(
            report,
            CycleReport {
                posted: 1,
                failed: 0,
                fetch_errors: 1
            }
        );
    }
}
