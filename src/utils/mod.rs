//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use std::fs;
use std::path::Path;

use serde::Serialize;

use self::error::StorageError;

/// Current UTC time as unix seconds
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Write a value as pretty JSON, replacing the file atomically
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    // Write to temp file first, then rename
    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(value)?;
    fs::write(&temp_path, content).map_err(|e| StorageError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StorageError::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer sentence", 10), "a longe...");
    }

    #[test]
    fn test_write_json_atomic_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_json_atomic(&path, &serde_json::json!({"seed": 1})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"seed\": 1"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
