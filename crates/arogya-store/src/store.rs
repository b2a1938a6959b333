//! The [`KeyValueStore`] abstraction over string-blob storage.
//!
//! The engine only ever needs three operations on whole values: read a
//! blob, overwrite it, and remove it. Backends implement exactly those and
//! nothing more; JSON encoding and key naming live in
//! [`EventArchive`](crate::archive::EventArchive).

use std::future::Future;

use crate::error::StoreError;

/// A minimal async key-value store holding string blobs.
///
/// Methods return `Send` futures so a store can be shared across tasks
/// spawned on the multi-threaded runtime.
pub trait KeyValueStore: Send + Sync {
    /// Read the value at `key`, or `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend read fails.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend write fails.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend delete fails.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
