// error.rs - Error types for the in-memory store driver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying a [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query targets a collection the store has never seen.
    #[error("unknown collection '{name}'")]
    UnknownCollection { name: String },

    /// Failed to read a fixture directory or file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A fixture file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A document is not a JSON object.
    #[error("document #{index} in collection '{collection}' is not a JSON object")]
    InvalidDocument { collection: String, index: usize },
}
