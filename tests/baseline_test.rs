//! Baseline persistence and reservation tests

use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

use gardenwatch::models::StockCategory;
use gardenwatch::storage::baseline::read_state;
use gardenwatch::storage::{BaselineState, BaselineStore, MarkerKey};

#[tokio::test]
async fn test_markers_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("last_state.json");

    {
        let store = BaselineStore::load(&path);
        assert!(store.reserve(MarkerKey::Stock(StockCategory::Seed), 150).await.unwrap());
        assert!(store.reserve(MarkerKey::Announcement, 42).await.unwrap());
        assert!(store.reserve_weather("rain", 1_700_000_000).await.unwrap());
    }

    let store = BaselineStore::load(&path);
    assert_eq!(store.get(MarkerKey::Stock(StockCategory::Seed)).await, 150);
    assert_eq!(store.get(MarkerKey::Announcement).await, 42);
    assert_eq!(store.weather_marker("rain").await, 1_700_000_000);

    // The restored markers still gate novelty
    assert!(!store.reserve(MarkerKey::Stock(StockCategory::Seed), 150).await.unwrap());
    assert!(!store.reserve_weather("rain", 1_700_000_000).await.unwrap());
}

#[test]
fn test_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("last_state.json");
    std::fs::write(
        &path,
        r#"{"seed": "120", "gear": 7.0, "egg": null, "weather": {"rain": 99, "snow": "12"}}"#,
    )
    .unwrap();

    let state = read_state(&path).unwrap().unwrap();
    assert_eq!(state.seed, 120);
    assert_eq!(state.gear, 7);
    assert_eq!(state.egg, 0);
    assert_eq!(state.weather_marker("rain"), 99);
    assert_eq!(state.weather_marker("snow"), 12);

    let json = serde_json::to_value(&state).unwrap();
    for key in ["seed", "gear", "egg", "cosmetic", "event_stock", "announcement", "weather"] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
}

#[test]
fn test_missing_file_reads_as_none() {
    let temp_dir = TempDir::new().unwrap();
    assert!(read_state(&temp_dir.path().join("absent.json")).unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_weather_list_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("last_state.json");
    std::fs::write(&path, r#"{"announcement": 10, "weather": ["rain"]}"#).unwrap();

    let store = BaselineStore::load(&path);
    assert_eq!(store.get(MarkerKey::Announcement).await, 10);
    assert!(store.snapshot().await.weather.is_empty());
    assert!(store.reserve_weather("rain", 5).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservation_has_one_winner() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(BaselineStore::load(temp_dir.path().join("last_state.json")));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.reserve(MarkerKey::Stock(StockCategory::Egg), 500).await.unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_weather_reservation_has_one_winner() {
    let store = Arc::new(BaselineStore::in_memory(BaselineState::default()));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.reserve_weather("thunderstorm", 1234).await.unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if task.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

proptest! {
    #[test]
    fn test_marker_never_decreases(markers in proptest::collection::vec(-1_000i64..1_000_000, 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = BaselineStore::in_memory(BaselineState::default());
            let key = MarkerKey::Stock(StockCategory::Cosmetic);
            let mut highest = 0i64;

            for marker in markers {
                let reserved = store.reserve(key, marker).await.unwrap();
                prop_assert_eq!(reserved, marker > highest);
                highest = highest.max(marker);
                prop_assert_eq!(store.get(key).await, highest);
            }
            Ok(())
        })?;
    }
}
