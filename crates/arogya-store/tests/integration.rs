//! Integration tests for the `arogya-store` persistence layer.
//!
//! The Dragonfly tests require a live instance. Run with:
//!
//! ```bash
//! docker run -d -p 6379:6379 docker.dragonflydb.io/dragonflydb/dragonfly
//! cargo test -p arogya-store -- --ignored
//! ```
//!
//! Those tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs. The in-memory tests always run.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use arogya_store::{DragonflyStore, EventArchive, KeyValueStore, MemoryStore, StoreError};
use arogya_types::{CaseId, CaseRecord, WaterLog, WaterLogId, WaterStatus};
use chrono::Utc;

/// Dragonfly connection URL for the local Docker instance.
const DRAGONFLY_URL: &str = "redis://localhost:6379";

fn sample_case() -> CaseRecord {
    CaseRecord {
        id: CaseId::new(),
        symptoms: vec![String::from("Diarrhea"), String::from("Vomiting")],
        diagnosis: Some(String::from("Suspected cholera")),
        village: String::from("Majuli"),
        timestamp: Utc::now(),
    }
}

fn sample_log() -> WaterLog {
    WaterLog {
        id: WaterLogId::new(),
        source_id: String::from("tube-well-3"),
        status: WaterStatus::Contaminated,
        village: String::from("Majuli"),
        timestamp: Utc::now(),
    }
}

// =============================================================================
// In-memory
// =============================================================================

#[tokio::test]
async fn memory_archive_roundtrips_both_collections() {
    let archive = EventArchive::new(MemoryStore::new());
    let cases = vec![sample_case(), sample_case()];
    let logs = vec![sample_log()];

    archive.save_cases(&cases).await.unwrap();
    archive.save_water_logs(&logs).await.unwrap();

    assert_eq!(archive.load_cases().await.unwrap(), Some(cases));
    assert_eq!(archive.load_water_logs().await.unwrap(), Some(logs));
}

#[tokio::test]
async fn corrupt_blob_surfaces_as_error() {
    let store = MemoryStore::new();
    store
        .set("arogya:cases", String::from("{\"schema_version\":1,"))
        .await
        .unwrap();
    let archive = EventArchive::new(store);

    let result = archive.load_cases().await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

// =============================================================================
// Dragonfly
// =============================================================================

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_set_get_delete() {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly -- is it running?");

    store.set("arogya-test:k", String::from("v")).await.unwrap();
    assert_eq!(
        store.get("arogya-test:k").await.unwrap().as_deref(),
        Some("v")
    );

    store.delete("arogya-test:k").await.unwrap();
    assert!(store.get("arogya-test:k").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires live Dragonfly instance"]
async fn dragonfly_archive_roundtrip_and_clear() {
    let store = DragonflyStore::connect(DRAGONFLY_URL)
        .await
        .expect("Failed to connect to Dragonfly -- is it running?");
    let archive = EventArchive::with_prefix(store, "arogya-test");

    let cases = vec![sample_case()];
    archive.save_cases(&cases).await.unwrap();
    assert_eq!(archive.load_cases().await.unwrap(), Some(cases));

    archive.clear().await.unwrap();
    assert!(archive.load_cases().await.unwrap().is_none());
    assert!(archive.load_water_logs().await.unwrap().is_none());
}
