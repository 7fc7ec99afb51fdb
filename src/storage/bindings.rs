//! Channel bindings: which output channel each category posts to
//!
//! Stored as a flat JSON object, one `<category>_channel_id` key per
//! category, rewritten in full on every change. `null` means unbound.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{Category, ChannelId};
use crate::utils::error::StorageError;
use crate::utils::write_json_atomic;

/// Category -> channel mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelBindings {
    channels: BTreeMap<Category, ChannelId>,
}

impl ChannelBindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bindings from a file; a missing file means nothing is bound
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        let value: Value = serde_json::from_str(&content)?;
        Ok(Self::from_json(&value))
    }

    /// Write all bindings to a file
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json_atomic(path, &self.to_json())?;
        tracing::debug!(path = %path.display(), "Channel bindings saved");
        Ok(())
    }

    /// Channel bound to a category
    pub fn get(&self, category: Category) -> Option<ChannelId> {
        self.channels.get(&category).copied()
    }

    /// Bind a category, returning the previous channel
    pub fn bind(&mut self, category: Category, channel: ChannelId) -> Option<ChannelId> {
        self.channels.insert(category, channel)
    }

    /// Clear a binding, returning the previous channel
    pub fn unbind(&mut self, category: Category) -> Option<ChannelId> {
        self.channels.remove(&category)
    }

    /// Iterate over bound categories
    pub fn iter(&self) -> impl Iterator<Item = (Category, ChannelId)> + '_ {
        self.channels.iter().map(|(c, id)| (*c, *id))
    }

    /// Number of bound categories
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn file_key(category: Category) -> String {
        format!("{}_channel_id", category.key())
    }

    fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for category in Category::all() {
            let value = match self.get(category) {
                Some(id) => Value::from(id),
                None => Value::Null,
            };
            obj.insert(Self::file_key(category), value);
        }
        Value::Object(obj)
    }

    fn from_json(value: &Value) -> Self {
        let mut bindings = Self::new();
        for category in Category::all() {
            let id = value.get(Self::file_key(category)).and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            });
            if let Some(id) = id.filter(|id| *id != 0) {
                bindings.bind(category, id);
            }
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockCategory;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let bindings = ChannelBindings::load(&temp_dir.path().join("channels.json")).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("channels.json");

        let mut bindings = ChannelBindings::new();
        bindings.bind(Category::Stock(StockCategory::Seed), 1234567890123456789);
        bindings.bind(Category::Weather, 42);
        bindings.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"seed_channel_id\": 1234567890123456789"));
        assert!(content.contains("\"gear_channel_id\": null"));
        assert!(content.contains("\"event_stock_channel_id\": null"));

        let loaded = ChannelBindings::load(&path).unwrap();
        assert_eq!(loaded, bindings);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_string_ids_accepted() {
        let value = serde_json::json!({
            "announcement_channel_id": "987",
            "egg_channel_id": null
        });
        let bindings = ChannelBindings::from_json(&value);
        assert_eq!(bindings.get(Category::Announcement), Some(987));
        assert_eq!(bindings.get(Category::Stock(StockCategory::Egg)), None);
    }

    #[test]
    fn test_bind_and_unbind() {
        let mut bindings = ChannelBindings::new();
        assert_eq!(bindings.bind(Category::Weather, 1), None);
        assert_eq!(bindings.bind(Category::Weather, 2), Some(1));
        assert_eq!(bindings.unbind(Category::Weather), Some(2));
        assert!(bindings.get(Category::Weather).is_none());
    }
}
