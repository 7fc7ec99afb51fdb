//! Core data structures for gardenwatch
//!
//! Categories, upstream snapshot types and the lenient decoding helpers
//! used to read the game-state API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::utils::error::FetchError;

/// Identifier of an output channel on the messaging platform
pub type ChannelId = u64;

// ============================================================================
// Categories
// ============================================================================

/// Stock shop categories tracked by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockCategory {
    Seed,
    Gear,
    Egg,
    Cosmetic,
    EventStock,
}

impl StockCategory {
    /// Baseline / configuration key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Gear => "gear",
            Self::Egg => "egg",
            Self::Cosmetic => "cosmetic",
            Self::EventStock => "event_stock",
        }
    }

    /// Field name of this category's item array in the stock payload
    pub fn api_field(&self) -> &'static str {
        match self {
            Self::Seed => "seed_stock",
            Self::Gear => "gear_stock",
            Self::Egg => "egg_stock",
            Self::Cosmetic => "cosmetic_stock",
            Self::EventStock => "eventshop_stock",
        }
    }

    /// Title used when rendering this category
    pub fn title(&self) -> &'static str {
        match self {
            Self::Seed => "Seeds 🌱",
            Self::Gear => "Gear ⚙️",
            Self::Egg => "Eggs 🥚",
            Self::Cosmetic => "Cosmetics 💄",
            Self::EventStock => "Event Stock 🎉",
        }
    }

    /// Parse from a key (`seed`, `event_stock`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seed" | "seeds" => Some(Self::Seed),
            "gear" => Some(Self::Gear),
            "egg" | "eggs" => Some(Self::Egg),
            "cosmetic" | "cosmetics" => Some(Self::Cosmetic),
            "event_stock" | "eventstock" | "event" => Some(Self::EventStock),
            _ => None,
        }
    }

    /// Get all stock categories
    pub fn all() -> [Self; 5] {
        [
            Self::Seed,
            Self::Gear,
            Self::Egg,
            Self::Cosmetic,
            Self::EventStock,
        ]
    }
}

impl std::fmt::Display for StockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Every event category that can be bound to an output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Stock(StockCategory),
    Weather,
    Announcement,
}

impl Category {
    /// Configuration key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Stock(s) => s.key(),
            Self::Weather => "weather",
            Self::Announcement => "announcement",
        }
    }

    /// Parse from a key; accepts the short admin command aliases too
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weather" => Some(Self::Weather),
            "announcement" | "announce" | "announcements" => Some(Self::Announcement),
            other => StockCategory::parse(other).map(Self::Stock),
        }
    }

    /// Get all categories in a stable order
    pub fn all() -> Vec<Self> {
        let mut all: Vec<Self> = StockCategory::all().into_iter().map(Self::Stock).collect();
        all.push(Self::Announcement);
        all.push(Self::Weather);
        all
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Upstream Snapshot Types
// ============================================================================

/// One item in a stock category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub item_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub display_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub start_date_unix: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub end_date_unix: i64,
}

impl StockItem {
    /// Name shown to users, falling back to the item id
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.item_id.as_deref())
            .unwrap_or("Unknown Item")
    }
}

/// An announcement carried in the stock payload's `notification` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: i64,

    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub end_timestamp: Option<i64>,
}

impl Announcement {
    /// Message text, empty when absent
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// End timestamp; zero or negative means it has none
    pub fn end(&self) -> Option<i64> {
        self.end_timestamp.filter(|end| *end > 0)
    }
}

/// Parsed response of the stock endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockSnapshot {
    /// Items per stock category; categories absent upstream are absent here
    pub categories: HashMap<StockCategory, Vec<StockItem>>,

    /// The current announcement (first entry of `notification`)
    pub announcement: Option<Announcement>,
}

impl StockSnapshot {
    /// Build a snapshot from the raw JSON body
    ///
    /// Accepts either an object or a list whose first element is the object.
    /// Items that fail to decode are skipped.
    pub fn from_value(raw: Value) -> Result<Self, FetchError> {
        let root = match raw {
            Value::Array(mut list) if !list.is_empty() => list.swap_remove(0),
            other => other,
        };

        let Value::Object(mut obj) = root else {
            return Err(FetchError::Malformed(
                "stock payload is not a JSON object".to_string(),
            ));
        };

        let mut categories = HashMap::new();
        for category in StockCategory::all() {
            if let Some(Value::Array(items)) = obj.remove(category.api_field()) {
                let parsed: Vec<StockItem> = items
                    .into_iter()
                    .filter_map(|v| serde_json::from_value(v).ok())
                    .collect();
                categories.insert(category, parsed);
            }
        }

        let announcement = match obj.remove("notification") {
            Some(Value::Array(notes)) => notes
                .into_iter()
                .next()
                .filter(Value::is_object)
                .and_then(|v| serde_json::from_value(v).ok()),
            _ => None,
        };

        Ok(Self {
            categories,
            announcement,
        })
    }

    /// Items for a category (empty slice if absent)
    pub fn items(&self, category: StockCategory) -> &[StockItem] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// One weather entry from the weather endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherOccurrence {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub weather_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub weather_name: Option<String>,

    #[serde(default)]
    pub active: bool,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub start_duration_unix: i64,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub duration: i64,

    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub end_duration_unix: Option<i64>,
}

impl WeatherOccurrence {
    /// Explicit end, or start + duration when both are known
    ///
    /// A non-positive explicit end counts as absent. An end that would
    /// overflow is treated as unknown.
    pub fn effective_end(&self) -> Option<i64> {
        self.end_duration_unix.filter(|end| *end > 0).or_else(|| {
            if self.start_duration_unix != 0 && self.duration != 0 {
                self.start_duration_unix.checked_add(self.duration)
            } else {
                None
            }
        })
    }

    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        self.weather_name
            .as_deref()
            .or(self.weather_id.as_deref())
            .unwrap_or("Unknown Weather")
    }
}

/// Parse the weather endpoint body (`{"weather": [...]}`)
///
/// Non-object entries and entries without a `weather_id` are dropped.
pub fn parse_weather(raw: Value) -> Result<Vec<WeatherOccurrence>, FetchError> {
    let Value::Object(mut obj) = raw else {
        return Err(FetchError::Malformed(
            "weather payload is not a JSON object".to_string(),
        ));
    };

    let entries = match obj.remove("weather") {
        Some(Value::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value::<WeatherOccurrence>(v).ok())
        .filter(|w| w.weather_id.as_deref().is_some_and(|id| !id.is_empty()))
        .collect())
}

// ============================================================================
// Lenient Decoding
// ============================================================================

pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

pub(crate) fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value).unwrap_or(0))
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_i64(&value))
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
