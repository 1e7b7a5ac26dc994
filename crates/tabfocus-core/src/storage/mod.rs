//! Persistent key-value store shared with the presentation layer.
//!
//! The store holds the saved-origin list and a handful of flags; it carries
//! no logic of its own. Everything is addressed through the async
//! [`KvStore`] trait so the core never knows which backend it runs on.

pub mod keys;
mod sqlite;
mod store;

pub use sqlite::SqliteStore;
pub use store::{get_typed, set_typed, KvStore, MemoryStore};

use std::path::PathBuf;

/// Returns `~/.config/tabfocus[-dev]/` based on TABFOCUS_ENV.
///
/// Set TABFOCUS_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TABFOCUS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tabfocus-dev")
    } else {
        base_dir.join("tabfocus")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
