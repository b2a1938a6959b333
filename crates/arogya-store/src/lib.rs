//! Persistence layer for the Arogya surveillance engine.
//!
//! The engine persists exactly two things: the case collection and the
//! water-log collection, each as one JSON blob under its own key. Derived
//! read models are never persisted; they are recomputed on load.
//!
//! ```text
//! SurveillanceController
//!     |
//!     +-- EventArchive (key naming + versioned JSON envelopes)
//!             |
//!             +-- KeyValueStore
//!                   |-- MemoryStore     (in-process)
//!                   +-- DragonflyStore  (Redis-compatible, via fred)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`KeyValueStore`] trait
//! - [`memory`] -- In-process backend
//! - [`dragonfly`] -- `Dragonfly` backend
//! - [`archive`] -- Versioned event-collection persistence
//! - [`error`] -- Shared error types

pub mod archive;
pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use archive::{EventArchive, PersistedCollection, SCHEMA_VERSION};
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::KeyValueStore;
