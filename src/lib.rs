//! gardenwatch - Grow a Garden notification relay
//!
//! Polls the upstream stock and weather endpoints, decides which
//! occurrences are new, posts them to the bound Discord channels and keeps
//! the posted messages' countdowns current until they expire.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Categories and upstream snapshot types
//! - [`fetcher`] - Upstream API client behind [`fetcher::SnapshotSource`]
//! - [`storage`] - Baseline markers and channel bindings
//! - [`detector`] - Novelty detection and marker reservation
//! - [`notifications`] - Message rendering and the [`notifications::Messenger`] seam
//! - [`tracker`] - Live countdown refresh of posted events
//! - [`relay`] - Per-category checks sharing one context
//! - [`scheduler`] - Periodic drivers and shutdown
//! - [`calculator`] - Item value calculator
//! - [`commands`] - Subcommand handlers
//!
//! # Example
//!
//! ```no_run
//! use gardenwatch::commands::{run, RunOptions};
//! use gardenwatch::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     run(config, RunOptions::default()).await
//! }
//! ```

pub mod calculator;
pub mod commands;
pub mod config;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod relay;
pub mod scheduler;
pub mod storage;
pub mod tracker;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, GardenwatchErrorTrait, Result};
    pub use crate::fetcher::{ApiFetcher, SnapshotSource};
    pub use crate::models::{Category, StockCategory, StockItem, StockSnapshot, WeatherOccurrence};
    pub use crate::notifications::{MessageContent, MessageHandle, Messenger};
    pub use crate::relay::{CheckMode, CheckOutcome, Relay};
    pub use crate::scheduler::{RelayHandle, RelayRunner};
    pub use crate::storage::{BaselineStore, ChannelBindings};
}

// Direct re-exports for convenience
pub use models::{Category, StockCategory};
