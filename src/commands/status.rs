use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::{Category, StockCategory};
use crate::storage::baseline::{read_state, MarkerKey};
use crate::storage::bindings::ChannelBindings;

/// Print channel bindings and baseline markers
pub fn status(config: &Config) -> Result<()> {
    let bindings = ChannelBindings::load(&config.storage.channels_path).with_context(|| {
        format!(
            "Failed to load channel bindings: {}",
            config.storage.channels_path.display()
        )
    })?;

    println!("Channel bindings ({})", config.storage.channels_path.display());
    println!("================");
    for category in Category::all() {
        match bindings.get(category) {
            Some(channel) => println!("  {:<14} {channel}", category.key()),
            None => println!("  {:<14} unbound", category.key()),
        }
    }

    println!();
    println!("Baseline ({})", config.storage.baseline_path.display());
    println!("========");

    let state = read_state(&config.storage.baseline_path).with_context(|| {
        format!(
            "Failed to read baseline: {}",
            config.storage.baseline_path.display()
        )
    })?;

    let Some(state) = state else {
        println!("  no baseline yet");
        return Ok(());
    };

    let keys = StockCategory::all()
        .into_iter()
        .map(MarkerKey::Stock)
        .chain(std::iter::once(MarkerKey::Announcement));
    for key in keys {
        println!("  {:<14} {}", key.as_str(), state.marker(key));
    }

    if state.weather.is_empty() {
        println!("  weather        none seen");
    } else {
        for (id, start) in &state.weather {
            println!("  weather/{id:<6} {start}");
        }
    }

    Ok(())
}
