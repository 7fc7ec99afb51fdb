//! Persisted state
//!
//! - [`baseline`] - last-seen markers per category, written on every reservation
//! - [`bindings`] - category to channel mapping

pub mod baseline;
pub mod bindings;

pub use baseline::{BaselineState, BaselineStore, MarkerKey};
pub use bindings::ChannelBindings;
