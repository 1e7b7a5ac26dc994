//! Core error types for tabfocus-core.
//!
//! Errors are grouped per area with thiserror and folded into [`CoreError`]
//! at the library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tabfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Browser host errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Persistent-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value does not deserialize into the expected shape
    #[error("Malformed value for key '{key}': {message}")]
    MalformedValue { key: String, message: String },

    /// The store backend is gone (worker task dropped, connection closed)
    #[error("Store unavailable")]
    Unavailable,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Browser-host errors. These are recoverable by design: an enforcement
/// poll that hits one skips the tick and tries again on the next.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Active tab query failed (closed window, permission denied)
    #[error("Active tab lookup failed: {0}")]
    TabLookup(String),

    /// Forced navigation or tab activation failed
    #[error("Navigation failed for tab {tab_id}: {message}")]
    Navigation { tab_id: i64, message: String },

    /// Warning/script injection into a tab failed
    #[error("Script injection failed: {0}")]
    Injection(String),

    /// The host environment is not reachable at all
    #[error("Browser host unavailable")]
    Unavailable,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
