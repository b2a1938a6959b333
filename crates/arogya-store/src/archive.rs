//! Versioned persistence of the two raw event collections.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{prefix}:cases` | JSON | Case collection, newest first |
//! | `{prefix}:water_logs` | JSON | Water-log collection, newest first |
//!
//! Each value is a [`PersistedCollection`] envelope. Blobs that are a bare
//! JSON array (written before the envelope existed) are read as schema
//! version 0.

use arogya_types::{CaseRecord, WaterLog};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "arogya";

/// On-disk envelope around a persisted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedCollection<T> {
    /// Version of the record layout.
    pub schema_version: u32,
    /// When the collection was written.
    pub saved_at: DateTime<Utc>,
    /// The records, newest first.
    pub records: Vec<T>,
}

/// Borrowing twin of [`PersistedCollection`] used for writes.
#[derive(Serialize)]
struct PersistedCollectionRef<'a, T> {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    records: &'a [T],
}

/// Just enough of the envelope to check the version before decoding records.
#[derive(Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

/// Reads and writes the case and water-log collections on a
/// [`KeyValueStore`].
#[derive(Debug)]
pub struct EventArchive<S> {
    store: S,
    cases_key: String,
    water_logs_key: String,
}

impl<S: KeyValueStore> EventArchive<S> {
    /// Create an archive using [`DEFAULT_PREFIX`].
    pub fn new(store: S) -> Self {
        Self::with_prefix(store, DEFAULT_PREFIX)
    }

    /// Create an archive whose keys start with `prefix`.
    pub fn with_prefix(store: S, prefix: &str) -> Self {
        Self {
            store,
            cases_key: format!("{prefix}:cases"),
            water_logs_key: format!("{prefix}:water_logs"),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Key holding the case collection.
    pub fn cases_key(&self) -> &str {
        &self.cases_key
    }

    /// Key holding the water-log collection.
    pub fn water_logs_key(&self) -> &str {
        &self.water_logs_key
    }

    /// Load the persisted case collection, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails, the blob is malformed, or
    /// it was written by an unknown schema version.
    pub async fn load_cases(&self) -> Result<Option<Vec<CaseRecord>>, StoreError> {
        self.load(&self.cases_key).await
    }

    /// Overwrite the persisted case collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn save_cases(&self, cases: &[CaseRecord]) -> Result<(), StoreError> {
        self.save(&self.cases_key, cases).await
    }

    /// Load the persisted water-log collection, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails, the blob is malformed, or
    /// it was written by an unknown schema version.
    pub async fn load_water_logs(&self) -> Result<Option<Vec<WaterLog>>, StoreError> {
        self.load(&self.water_logs_key).await
    }

    /// Overwrite the persisted water-log collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn save_water_logs(&self, logs: &[WaterLog]) -> Result<(), StoreError> {
        self.save(&self.water_logs_key, logs).await
    }

    /// Delete both persisted collections.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either delete fails.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.delete(&self.cases_key).await?;
        self.store.delete(&self.water_logs_key).await
    }

    async fn save<T: Serialize + Sync>(&self, key: &str, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(&PersistedCollectionRef {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            records,
        })?;
        debug!(key, records = records.len(), bytes = json.len(), "Persisting collection");
        self.store.set(key, json).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        decode_collection(key, &raw).map(Some)
    }
}

/// Decode a persisted blob, accepting both the envelope and the legacy
/// bare-array layout.
///
/// # Errors
///
/// Returns [`StoreError::SchemaVersion`] for an unknown version, or
/// [`StoreError::Serialization`] for malformed JSON.
pub fn decode_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>, StoreError> {
    if raw.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(raw)?);
    }

    let probe: VersionProbe = serde_json::from_str(raw)?;
    if probe.schema_version != SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion {
            key: key.to_owned(),
            found: probe.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let envelope: PersistedCollection<T> = serde_json::from_str(raw)?;
    Ok(envelope.records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use arogya_types::{CaseId, WaterLogId, WaterStatus};

    use super::*;
    use crate::memory::MemoryStore;

    fn case(village: &str) -> CaseRecord {
        CaseRecord {
            id: CaseId::new(),
            symptoms: vec![String::from("Fever")],
            diagnosis: None,
            village: village.to_owned(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_loads_none() {
        let archive = EventArchive::new(MemoryStore::new());
        assert!(archive.load_cases().await.unwrap().is_none());
        assert!(archive.load_water_logs().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_cases_keep_their_order() {
        let archive = EventArchive::new(MemoryStore::new());
        let cases = vec![case("Majuli"), case("Jorhat")];
        archive.save_cases(&cases).await.unwrap();

        let loaded = archive.load_cases().await.unwrap().unwrap();
        assert_eq!(loaded, cases);
    }

    #[tokio::test]
    async fn collections_use_independent_keys() {
        let archive = EventArchive::with_prefix(MemoryStore::new(), "test");
        assert_eq!(archive.cases_key(), "test:cases");
        assert_eq!(archive.water_logs_key(), "test:water_logs");

        let log = WaterLog {
            id: WaterLogId::new(),
            source_id: String::from("well-7"),
            status: WaterStatus::Contaminated,
            village: String::from("Majuli"),
            timestamp: Utc::now(),
        };
        archive.save_water_logs(std::slice::from_ref(&log)).await.unwrap();

        assert!(archive.load_cases().await.unwrap().is_none());
        assert_eq!(archive.load_water_logs().await.unwrap(), Some(vec![log]));
    }

    #[tokio::test]
    async fn clear_removes_both_keys() {
        let archive = EventArchive::new(MemoryStore::new());
        archive.save_cases(&[case("Majuli")]).await.unwrap();
        archive.save_water_logs(&[]).await.unwrap();
        archive.clear().await.unwrap();
        assert!(archive.store().is_empty().await);
    }

    #[test]
    fn legacy_bare_array_is_accepted() {
        let cases = vec![case("Majuli")];
        let raw = serde_json::to_string(&cases).unwrap();
        let decoded: Vec<CaseRecord> = decode_collection("k", &raw).unwrap();
        assert_eq!(decoded, cases);
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let raw = r#"{"schema_version":99,"saved_at":"2026-01-01T00:00:00Z","records":[]}"#;
        let result: Result<Vec<CaseRecord>, _> = decode_collection("k", raw);
        assert!(matches!(
            result,
            Err(StoreError::SchemaVersion { found: 99, expected: 1, .. })
        ));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let result: Result<Vec<CaseRecord>, _> = decode_collection("k", "not json");
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
