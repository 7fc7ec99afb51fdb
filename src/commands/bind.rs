//! Administrator-only channel binding
//!
//! Binding rewrites the whole channel file. A refused request leaves the
//! file untouched.

use std::path::Path;
use thiserror::Error;

use crate::error::Result;
use crate::models::{Category, ChannelId};
use crate::storage::bindings::ChannelBindings;

/// Who is asking
///
/// The CLI builds this from the operator's own `--admin` flag, so it is an
/// attestation rather than a verified role. Write access to the channel file
/// is governed by filesystem permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invoker {
    pub is_administrator: bool,
}

impl Invoker {
    pub fn administrator() -> Self {
        Self {
            is_administrator: true,
        }
    }

    pub fn member() -> Self {
        Self::default()
    }
}

/// Binding command errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Admin only")]
    PermissionDenied,

    #[error("Unknown category '{0}' (expected one of: {list})", list = category_list())]
    UnknownCategory(String),

    #[error("Channel id must be non-zero")]
    InvalidChannel,
}

fn category_list() -> String {
    Category::all()
        .iter()
        .map(|c| c.key())
        .collect::<Vec<_>>()
        .join(", ")
}

fn authorize(invoker: Invoker, category: &str) -> std::result::Result<Category, BindError> {
    if !invoker.is_administrator {
        return Err(BindError::PermissionDenied);
    }
    Category::parse(category).ok_or_else(|| BindError::UnknownCategory(category.to_string()))
}

/// Bind `category` to `channel`, returning the previous channel
pub fn bind(
    path: &Path,
    invoker: Invoker,
    category: &str,
    channel: ChannelId,
) -> Result<Option<ChannelId>> {
    let category = authorize(invoker, category)?;
    if channel == 0 {
        return Err(BindError::InvalidChannel.into());
    }

    let mut bindings = ChannelBindings::load(path)?;
    let previous = bindings.bind(category, channel);
    bindings.save(path)?;

    tracing::info!(category = %category, channel_id = channel, ?previous, "Channel bound");
    Ok(previous)
}

/// Clear the binding of `category`, returning the removed channel
pub fn unbind(path: &Path, invoker: Invoker, category: &str) -> Result<Option<ChannelId>> {
    let category = authorize(invoker, category)?;

    let mut bindings = ChannelBindings::load(path)?;
    let previous = bindings.unbind(category);
    bindings.save(path)?;

    tracing::info!(category = %category, ?previous, "Channel unbound");
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::StockCategory;
    use tempfile::TempDir;

    #[test]
    fn test_member_cannot_bind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");

        let err = bind(&path, Invoker::member(), "seed", 42).unwrap_err();
        assert!(matches!(err, Error::Bind(BindError::PermissionDenied)));
        assert!(!path.exists());
    }

    #[test]
    fn test_bind_and_unbind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");
        let admin = Invoker::administrator();

        assert_eq!(bind(&path, admin, "seed", 42).unwrap(), None);
        assert_eq!(bind(&path, admin, "seed", 43).unwrap(), Some(42));
        assert_eq!(bind(&path, admin, "weather", 7).unwrap(), None);

        let loaded = ChannelBindings::load(&path).unwrap();
        assert_eq!(loaded.get(Category::Stock(StockCategory::Seed)), Some(43));
        assert_eq!(loaded.get(Category::Weather), Some(7));

        assert_eq!(unbind(&path, admin, "seed").unwrap(), Some(43));
        assert_eq!(unbind(&path, admin, "seed").unwrap(), None);
        let loaded = ChannelBindings::load(&path).unwrap();
        assert_eq!(loaded.get(Category::Stock(StockCategory::Seed)), None);
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_unknown_category() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");

        let err = bind(&path, Invoker::administrator(), "fruit", 1).unwrap_err();
        assert!(matches!(err, Error::Bind(BindError::UnknownCategory(ref c)) if c == "fruit"));
        assert!(err.to_string().contains("event_stock"));
        assert!(!path.exists());
    }

    #[test]
    fn test_zero_channel_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("channels.json");

        let err = bind(&path, Invoker::administrator(), "egg", 0).unwrap_err();
        assert!(matches!(err, Error::Bind(BindError::InvalidChannel)));
    }
}
