//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gardenwatch::fetcher::SnapshotSource;
use gardenwatch::models::{
    Announcement, Category, ChannelId, StockCategory, StockItem, StockSnapshot, WeatherOccurrence,
};
use gardenwatch::notifications::MemoryMessenger;
use gardenwatch::relay::Relay;
use gardenwatch::storage::{BaselineStore, ChannelBindings};
use gardenwatch::utils::error::FetchError;

/// Snapshot source serving canned data and counting fetches
#[derive(Default)]
pub struct StaticSource {
    stock: Mutex<StockSnapshot>,
    weather: Mutex<Vec<WeatherOccurrence>>,
    stock_fetches: AtomicUsize,
    weather_fetches: AtomicUsize,
    fail: AtomicBool,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&self, category: StockCategory, items: Vec<StockItem>) {
        self.stock.lock().unwrap().categories.insert(category, items);
    }

    pub fn set_announcement(&self, announcement: Option<Announcement>) {
        self.stock.lock().unwrap().announcement = announcement;
    }

    pub fn set_weather(&self, weather: Vec<WeatherOccurrence>) {
        *self.weather.lock().unwrap() = weather;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn stock_fetches(&self) -> usize {
        self.stock_fetches.load(Ordering::SeqCst)
    }

    pub fn weather_fetches(&self) -> usize {
        self.weather_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSource {
    async fn fetch_stock(&self) -> Result<StockSnapshot, FetchError> {
        self.stock_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status(503));
        }
        Ok(self.stock.lock().unwrap().clone())
    }

    async fn fetch_weather(&self) -> Result<Vec<WeatherOccurrence>, FetchError> {
        self.weather_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Timeout);
        }
        Ok(self.weather.lock().unwrap().clone())
    }
}

/// Create a stock item
pub fn item(name: &str, quantity: i64, start: i64, end: i64) -> StockItem {
    StockItem {
        item_id: Some(name.to_lowercase().replace(' ', "_")),
        display_name: Some(name.to_string()),
        quantity,
        start_date_unix: start,
        end_date_unix: end,
    }
}

/// Create an active weather occurrence with a known duration
pub fn weather(id: &str, name: &str, start: i64, duration: i64) -> WeatherOccurrence {
    WeatherOccurrence {
        weather_id: Some(id.to_string()),
        weather_name: Some(name.to_string()),
        active: true,
        start_duration_unix: start,
        duration,
        end_duration_unix: None,
    }
}

/// Create an announcement
pub fn announcement(message: &str, timestamp: i64, end: Option<i64>) -> Announcement {
    Announcement {
        message: Some(message.to_string()),
        timestamp,
        end_timestamp: end,
    }
}

/// Bindings with each category on its own channel (`100 + index`)
pub fn bind(categories: &[Category]) -> ChannelBindings {
    let mut bindings = ChannelBindings::new();
    for (i, category) in categories.iter().enumerate() {
        bindings.bind(*category, 100 + i as ChannelId);
    }
    bindings
}

/// Test harness around one relay
pub struct Harness {
    pub relay: Arc<Relay>,
    pub source: Arc<StaticSource>,
    pub messenger: Arc<MemoryMessenger>,
    pub baseline: Arc<BaselineStore>,
}

impl Harness {
    pub fn new(bindings: ChannelBindings, baseline: BaselineStore) -> Self {
        let source = Arc::new(StaticSource::new());
        let messenger = Arc::new(MemoryMessenger::new());
        let baseline = Arc::new(baseline);
        let relay = Relay::new(
            source.clone(),
            messenger.clone(),
            baseline.clone(),
            bindings,
        );

        Self {
            relay: Arc::new(relay),
            source,
            messenger,
            baseline,
        }
    }

    pub fn in_memory(bindings: ChannelBindings) -> Self {
        Self::new(bindings, BaselineStore::in_memory(Default::default()))
    }
}
