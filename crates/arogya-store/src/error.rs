//! Error types for the persistence layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`fred`] and [`serde_json`] errors with context about which key failed.

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted blob was written by an unknown schema version.
    #[error("Unsupported schema version {found} at key {key} (expected {expected})")]
    SchemaVersion {
        /// The key holding the blob.
        key: String,
        /// Version found in the blob.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
