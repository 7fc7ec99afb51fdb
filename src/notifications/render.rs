//! Rendering of occurrences into message content
//!
//! Every function takes `now` explicitly so that the refresh driver can
//! recompute countdowns from the stored inputs.

use crate::models::{Announcement, StockCategory, StockItem, WeatherOccurrence};
use crate::notifications::{colors, MessageContent};
use crate::utils::truncate_text;

/// Embed description limit on the platform
const MAX_DESCRIPTION_CHARS: usize = 4096;

pub const FIELD_RESTOCKS_IN: &str = "⏱️ Restocks In";
pub const FIELD_UPDATED: &str = "🕒 Updated";
pub const FIELD_ENDS_IN: &str = "⏱️ Ends In";
pub const FIELD_STARTED: &str = "🕒 Started";
pub const FIELD_POSTED: &str = "🕒 Posted";

/// Remaining time as `"{m}m {s}s"`, or `"Ended"` once `end_ts` has passed
pub fn format_countdown(end_ts: i64, now: i64) -> String {
    let remaining = end_ts.saturating_sub(now);
    if remaining <= 0 {
        return "Ended".to_string();
    }
    format!("{}m {}s", remaining / 60, remaining % 60)
}

/// Relative time such as `"1 minute ago"` or `"3 hours ago"`
pub fn time_ago(ts: i64, now: i64) -> String {
    let diff = now.saturating_sub(ts).max(0);

    let (amount, unit) = match diff {
        d if d < 60 => (d, "second"),
        d if d < 3_600 => (d / 60, "minute"),
        d if d < 86_400 => (d / 3_600, "hour"),
        d => (d / 86_400, "day"),
    };

    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

/// Render one stock occurrence
pub fn stock_message(
    category: StockCategory,
    items: &[StockItem],
    start_ts: i64,
    end_ts: i64,
    now: i64,
) -> MessageContent {
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("**{}** x{}", item.name(), item.quantity))
        .collect();
    let description = if lines.is_empty() {
        "No items in stock".to_string()
    } else {
        lines.join("\n")
    };

    MessageContent::new(category.title(), colors::STOCK)
        .with_description(truncate_text(&description, MAX_DESCRIPTION_CHARS))
        .with_field(FIELD_RESTOCKS_IN, format_countdown(end_ts, now), true)
        .with_field(FIELD_UPDATED, time_ago(start_ts, now), true)
}

/// Render one weather occurrence
pub fn weather_message(weather: &WeatherOccurrence, now: i64) -> MessageContent {
    let ends_in = match weather.effective_end() {
        Some(end) => format_countdown(end, now),
        None => "Unknown".to_string(),
    };

    MessageContent::new(format!("🌦️ {}", weather.name()), colors::WEATHER)
        .with_field(FIELD_ENDS_IN, ends_in, true)
        .with_field(FIELD_STARTED, time_ago(weather.start_duration_unix, now), true)
}

/// Render an announcement
///
/// The "Ends In" field is present only while the announcement has an end in
/// the future.
pub fn announcement_message(announcement: &Announcement, now: i64) -> MessageContent {
    let mut content = MessageContent::new("📝 Announcement", colors::ANNOUNCEMENT)
        .with_description(truncate_text(announcement.text(), MAX_DESCRIPTION_CHARS))
        .with_field(FIELD_POSTED, time_ago(announcement.timestamp, now), false);

    if let Some(end) = announcement.end().filter(|end| *end > now) {
        content = content.with_field(FIELD_ENDS_IN, format_countdown(end, now), true);
    }

    content
}
