//! Command handlers behind the `gardenwatch` subcommands
//!
//! Each handler takes already-parsed arguments and the loaded [`Config`],
//! prints its result for an operator, and returns `anyhow::Result`.
//!
//! [`Config`]: crate::config::Config

pub mod bind;
pub mod calculate;
pub mod run;
pub mod status;

pub use bind::{bind, unbind, BindError, Invoker};
pub use calculate::calculate;
pub use run::{run, RunOptions};
pub use status::status;
