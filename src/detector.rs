//! Novelty detection
//!
//! Decides whether a freshly fetched snapshot is a new occurrence and, if so,
//! reserves its marker in the baseline before anything is sent. A reserved
//! occurrence is owned by the caller: the marker is not rolled back if
//! delivery later fails.

use std::sync::Arc;

use crate::models::{Announcement, StockCategory, StockItem, WeatherOccurrence};
use crate::storage::baseline::{BaselineStore, MarkerKey, StorageResult};

/// Outcome of a novelty check
#[derive(Debug, Clone, PartialEq)]
pub enum Novelty<T> {
    /// A new occurrence whose marker has been reserved
    New(T),
    /// Already seen, inactive or empty
    Stale,
}

impl<T> Novelty<T> {
    /// Check if this is a new occurrence
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    /// Convert into an option
    pub fn into_new(self) -> Option<T> {
        match self {
            Self::New(value) => Some(value),
            Self::Stale => None,
        }
    }
}

/// One stock window for a category
///
/// All items of a category in one snapshot collapse into a single
/// occurrence spanning the latest start and the latest end.
#[derive(Debug, Clone, PartialEq)]
pub struct StockOccurrence {
    pub category: StockCategory,
    pub start_ts: i64,
    pub end_ts: i64,
    pub items: Vec<StockItem>,
}

impl StockOccurrence {
    /// Collapse a category's items; `None` when there are no items
    pub fn collapse(category: StockCategory, items: &[StockItem]) -> Option<Self> {
        let start_ts = items.iter().map(|i| i.start_date_unix).max()?;
        let end_ts = items.iter().map(|i| i.end_date_unix).max()?;

        Some(Self {
            category,
            start_ts,
            end_ts,
            items: items.to_vec(),
        })
    }
}

/// Novelty detector over the shared baseline
#[derive(Clone)]
pub struct NoveltyDetector {
    baseline: Arc<BaselineStore>,
}

impl NoveltyDetector {
    pub fn new(baseline: Arc<BaselineStore>) -> Self {
        Self { baseline }
    }

    /// Baseline this detector reserves against
    pub fn baseline(&self) -> &Arc<BaselineStore> {
        &self.baseline
    }

    /// Check a stock category
    pub async fn detect_stock(
        &self,
        category: StockCategory,
        items: &[StockItem],
    ) -> StorageResult<Novelty<StockOccurrence>> {
        let Some(occurrence) = StockOccurrence::collapse(category, items) else {
            return Ok(Novelty::Stale);
        };

        let key = MarkerKey::Stock(category);
        if !self.baseline.reserve(key, occurrence.start_ts).await? {
            tracing::debug!(
                category = %category,
                start_ts = occurrence.start_ts,
                "No new stock"
            );
            return Ok(Novelty::Stale);
        }

        Ok(Novelty::New(occurrence))
    }

    /// Check one weather entry
    ///
    /// Inactive entries and entries whose effective end is before `now` are
    /// never new.
    pub async fn detect_weather(
        &self,
        weather: &WeatherOccurrence,
        now: i64,
    ) -> StorageResult<Novelty<WeatherOccurrence>> {
        let Some(weather_id) = weather.weather_id.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(Novelty::Stale);
        };

        if !weather.active {
            return Ok(Novelty::Stale);
        }

        if weather.effective_end().is_some_and(|end| end < now) {
            tracing::debug!(weather_id, "Weather already ended");
            return Ok(Novelty::Stale);
        }

        if !self
            .baseline
            .reserve_weather(weather_id, weather.start_duration_unix)
            .await?
        {
            tracing::debug!(weather_id, start_ts = weather.start_duration_unix, "No new weather");
            return Ok(Novelty::Stale);
        }

        Ok(Novelty::New(weather.clone()))
    }

    /// Check the current announcement
    pub async fn detect_announcement(
        &self,
        announcement: &Announcement,
    ) -> StorageResult<Novelty<Announcement>> {
        if announcement.text().trim().is_empty() {
            return Ok(Novelty::Stale);
        }

        if !self
            .baseline
            .reserve(MarkerKey::Announcement, announcement.timestamp)
            .await?
        {
            tracing::debug!(timestamp = announcement.timestamp, "No new announcement");
            return Ok(Novelty::Stale);
        }

        Ok(Novelty::New(announcement.clone()))
    }
}
