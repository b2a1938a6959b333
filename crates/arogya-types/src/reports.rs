//! Inbound report payloads submitted by field collaborators.
//!
//! These carry only what a reporter knows; the controller assigns the ID
//! and timestamp when the report is accepted. Field-level limits are
//! declared with `validator` so they are checked at the ingestion boundary
//! and never inside the risk engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::WaterStatus;

/// A case report as submitted by a field worker or resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct CaseReport {
    /// Village the case belongs to.
    #[validate(length(min = 1, max = 64))]
    pub village: String,
    /// Reported symptom names.
    #[validate(length(min = 1, max = 32))]
    pub symptoms: Vec<String>,
    /// Optional diagnosis label.
    #[validate(length(max = 128))]
    #[serde(default)]
    pub diagnosis: Option<String>,
}

impl CaseReport {
    /// Convenience constructor for a report without a diagnosis.
    pub fn new(village: impl Into<String>, symptoms: &[&str]) -> Self {
        Self {
            village: village.into(),
            symptoms: symptoms.iter().map(|s| (*s).to_owned()).collect(),
            diagnosis: None,
        }
    }
}

/// A water-quality observation as submitted by a field worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Validate)]
#[ts(export, export_to = "bindings/")]
pub struct WaterReport {
    /// Identifier of the physical source.
    #[validate(length(min = 1, max = 64))]
    pub source_id: String,
    /// Observed status.
    pub status: WaterStatus,
    /// Village the source serves.
    #[validate(length(min = 1, max = 64))]
    pub village: String,
}

impl WaterReport {
    /// Convenience constructor.
    pub fn new(source_id: impl Into<String>, status: WaterStatus, village: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            status,
            village: village.into(),
        }
    }
}
