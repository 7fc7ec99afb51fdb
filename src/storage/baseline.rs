//! Baseline store: the persisted "last processed" marker per category
//!
//! The baseline is the single source of truth for whether an occurrence has
//! ever been sent. Markers are advanced by reservation under one lock that is
//! shared by all categories, and the full state is written to disk before the
//! lock is released.
//!
//! # File Format
//!
//! ```json
//! {
//!   "seed": 1718000000,
//!   "gear": 0,
//!   "egg": 0,
//!   "cosmetic": 0,
//!   "event_stock": 0,
//!   "announcement": 1717990000,
//!   "weather": { "rain": 1718000100 }
//! }
//! ```
//!
//! Older files stored `weather` as a list. Such values are discarded on load
//! and the weather mapping starts empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::models::{lenient_i64, value_to_i64, StockCategory};
use crate::utils::error::StorageError;
use crate::utils::write_json_atomic;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// Baseline State
// ============================================================================

/// Key of a simple (single integer) marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    Stock(StockCategory),
    Announcement,
}

impl MarkerKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock(category) => category.key(),
            Self::Announcement => "announcement",
        }
    }
}

impl std::fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted markers for every category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineState {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub seed: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub gear: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub egg: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub cosmetic: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub event_stock: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub announcement: i64,

    /// Weather id -> start timestamp of the last occurrence sent
    #[serde(default, deserialize_with = "weather_markers")]
    pub weather: BTreeMap<String, i64>,
}

impl BaselineState {
    /// Read a simple marker
    pub fn marker(&self, key: MarkerKey) -> i64 {
        match key {
            MarkerKey::Stock(StockCategory::Seed) => self.seed,
            MarkerKey::Stock(StockCategory::Gear) => self.gear,
            MarkerKey::Stock(StockCategory::Egg) => self.egg,
            MarkerKey::Stock(StockCategory::Cosmetic) => self.cosmetic,
            MarkerKey::Stock(StockCategory::EventStock) => self.event_stock,
            MarkerKey::Announcement => self.announcement,
        }
    }

    fn marker_mut(&mut self, key: MarkerKey) -> &mut i64 {
        match key {
            MarkerKey::Stock(StockCategory::Seed) => &mut self.seed,
            MarkerKey::Stock(StockCategory::Gear) => &mut self.gear,
            MarkerKey::Stock(StockCategory::Egg) => &mut self.egg,
            MarkerKey::Stock(StockCategory::Cosmetic) => &mut self.cosmetic,
            MarkerKey::Stock(StockCategory::EventStock) => &mut self.event_stock,
            MarkerKey::Announcement => &mut self.announcement,
        }
    }

    /// Read the marker for a weather id (0 if never seen)
    pub fn weather_marker(&self, weather_id: &str) -> i64 {
        self.weather.get(weather_id).copied().unwrap_or(0)
    }
}

fn weather_markers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(id, marker)| (id, value_to_i64(&marker).unwrap_or(0)))
            .collect(),
        Value::Null => BTreeMap::new(),
        _ => {
            tracing::warn!("Discarding legacy weather markers, resetting to an empty mapping");
            BTreeMap::new()
        }
    })
}

/// Read a baseline file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_state(path: &Path) -> StorageResult<Option<BaselineState>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let state = serde_json::from_str(&content)?;
    Ok(Some(state))
}

// ============================================================================
// Baseline Store
// ============================================================================

/// Lock-guarded baseline with write-through persistence
pub struct BaselineStore {
    /// Backing file; `None` keeps the state in memory only
    path: Option<PathBuf>,

    state: Mutex<BaselineState>,
}

impl BaselineStore {
    /// Load the baseline from `path`
    ///
    /// A missing file starts from zero markers. A file that cannot be read or
    /// parsed is logged and also replaced by zero markers.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let state = match read_state(&path) {
            Ok(Some(state)) => {
                tracing::info!(path = %path.display(), "Baseline loaded");
                state
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "No baseline file, starting fresh");
                BaselineState::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable baseline, starting fresh");
                BaselineState::default()
            }
        };

        Self {
            path: Some(path),
            state: Mutex::new(state),
        }
    }

    /// Create a store that never touches disk
    pub fn in_memory(state: BaselineState) -> Self {
        Self {
            path: None,
            state: Mutex::new(state),
        }
    }

    /// Backing file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current marker for a simple category
    pub async fn get(&self, key: MarkerKey) -> i64 {
        self.state.lock().await.marker(key)
    }

    /// Current marker for a weather id
    pub async fn weather_marker(&self, weather_id: &str) -> i64 {
        self.state.lock().await.weather_marker(weather_id)
    }

    /// Reserve `marker` for `key`
    ///
    /// Succeeds only if `marker` is strictly greater than the stored value.
    /// The new state is persisted before the lock is released; if that fails
    /// the marker is rolled back and the error returned.
    pub async fn reserve(&self, key: MarkerKey, marker: i64) -> StorageResult<bool> {
        let mut state = self.state.lock().await;

        let previous = state.marker(key);
        if marker <= previous {
            return Ok(false);
        }

        *state.marker_mut(key) = marker;
        if let Err(e) = self.write(&state) {
            *state.marker_mut(key) = previous;
            return Err(e);
        }

        tracing::debug!(key = %key, marker, previous, "Marker reserved");
        Ok(true)
    }

    /// Reserve the start timestamp of a weather occurrence
    ///
    /// Succeeds when `start` differs from the stored start for this id.
    pub async fn reserve_weather(&self, weather_id: &str, start: i64) -> StorageResult<bool> {
        let mut state = self.state.lock().await;

        let previous = state.weather.get(weather_id).copied();
        if start == previous.unwrap_or(0) {
            return Ok(false);
        }

        state.weather.insert(weather_id.to_string(), start);
        if let Err(e) = self.write(&state) {
            match previous {
                Some(p) => state.weather.insert(weather_id.to_string(), p),
                None => state.weather.remove(weather_id),
            };
            return Err(e);
        }

        tracing::debug!(weather_id, start, "Weather marker reserved");
        Ok(true)
    }

    /// Write the full current state
    pub async fn persist(&self) -> StorageResult<()> {
        let state = self.state.lock().await;
        self.write(&state)
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> BaselineState {
        self.state.lock().await.clone()
    }

    fn write(&self, state: &BaselineState) -> StorageResult<()> {
        match &self.path {
            Some(path) => write_json_atomic(path, state),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_defaults() {
        let state: BaselineState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, BaselineState::default());
        assert_eq!(state.marker(MarkerKey::Announcement), 0);
        assert_eq!(state.weather_marker("rain"), 0);
    }

    #[test]
    fn test_legacy_weather_list_is_discarded() {
        let state: BaselineState =
            serde_json::from_str(r#"{"seed": 5, "weather": ["rain", "snow"]}"#).unwrap();
        assert_eq!(state.seed, 5);
        assert!(state.weather.is_empty());
    }

    #[tokio::test]
    async fn test_reserve_monotonic() {
        let store = BaselineStore::in_memory(BaselineState::default());
        let key = MarkerKey::Stock(StockCategory::Gear);

        assert!(store.reserve(key, 10).await.unwrap());
        assert!(store.reserve(key, 20).await.unwrap());
        assert!(!store.reserve(key, 15).await.unwrap());
        assert!(!store.reserve(key, 20).await.unwrap());
        assert_eq!(store.get(key).await, 20);
    }

    #[tokio::test]
    async fn test_reserve_weather_on_change() {
        let store = BaselineStore::in_memory(BaselineState::default());

        assert!(!store.reserve_weather("rain", 0).await.unwrap());
        assert!(store.reserve_weather("rain", 100).await.unwrap());
        assert!(!store.reserve_weather("rain", 100).await.unwrap());
        // A different start is a new occurrence even if it is earlier
        assert!(store.reserve_weather("rain", 50).await.unwrap());
        assert_eq!(store.weather_marker("rain").await, 50);
    }

    #[tokio::test]
    async fn test_reserve_writes_through() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("last_state.json");
        let store = BaselineStore::load(&path);

        store
            .reserve(MarkerKey::Stock(StockCategory::Seed), 150)
            .await
            .unwrap();

        let on_disk = read_state(&path).unwrap().unwrap();
        assert_eq!(on_disk.seed, 150);
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = BaselineStore::load(blocker.join("last_state.json"));

        let key = MarkerKey::Stock(StockCategory::Egg);
        assert!(store.reserve(key, 10).await.is_err());
        assert_eq!(store.get(key).await, 0);

        assert!(store.reserve_weather("rain", 10).await.is_err());
        assert_eq!(store.weather_marker("rain").await, 0);
        assert!(store.snapshot().await.weather.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("last_state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = BaselineStore::load(&path);
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.snapshot().await, BaselineState::default());
    }
}
