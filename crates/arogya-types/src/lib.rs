//! Shared type definitions for the Arogya health-surveillance engine.
//!
//! This crate is the single source of truth for the records and read models
//! exchanged between the engine and its collaborators. Types flow to
//! `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for record identifiers
//! - [`enums`] -- Risk levels, water status, cluster lifecycle, stock status
//! - [`structs`] -- Event records and derived read models
//! - [`reports`] -- Inbound report payloads with boundary validation rules

pub mod enums;
pub mod ids;
pub mod reports;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertSeverity, ClusterStatus, RiskLevel, StockStatus, Trend, WaterStatus};
pub use ids::{AlertId, CaseId, ClusterId, WaterLogId};
pub use reports::{CaseReport, WaterReport};
pub use structs::{
    Alert, CaseRecord, Cluster, DistrictAggregates, PhcMetric, ResourceStock, VillageStats,
    WaterLog,
};
