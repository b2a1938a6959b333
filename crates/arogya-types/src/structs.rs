//! Core record and read-model structs.
//!
//! Event records ([`CaseRecord`], [`WaterLog`]) are immutable once created.
//! Read models ([`VillageStats`], [`DistrictAggregates`]) are derived and
//! rebuilt from scratch after every mutation. [`Cluster`] and
//! [`ResourceStock`] are the only records with mutable fields, and each has
//! a narrow set of mutators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AlertSeverity, ClusterStatus, RiskLevel, StockStatus, Trend, WaterStatus};
use crate::ids::{AlertId, CaseId, ClusterId, WaterLogId};

// ---------------------------------------------------------------------------
// Event records
// ---------------------------------------------------------------------------

/// A single symptom report submitted for a resident of a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CaseRecord {
    /// Unique case identifier.
    pub id: CaseId,
    /// Reported symptom names, in the order given. Duplicates are kept.
    pub symptoms: Vec<String>,
    /// Optional diagnosis label from a health worker.
    pub diagnosis: Option<String>,
    /// The village the case belongs to.
    pub village: String,
    /// When the case was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A single water-quality observation for a physical water source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WaterLog {
    /// Unique observation identifier.
    pub id: WaterLogId,
    /// Identifier of the physical source (well, pump, tank).
    pub source_id: String,
    /// Observed safety status.
    pub status: WaterStatus,
    /// The village the source serves.
    pub village: String,
    /// When the observation was recorded.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Derived read models
// ---------------------------------------------------------------------------

/// Per-village risk picture, recomputed from the full event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VillageStats {
    /// The village these stats describe.
    pub village: String,
    /// All-time case count.
    pub total_cases: u32,
    /// Cases considered active. There is no notion of case closure yet, so
    /// this always equals `total_cases`.
    pub active_cases: u32,
    /// Risk score, always within `0..=100`.
    pub risk_score: u32,
    /// Level derived from `risk_score`.
    pub risk_level: RiskLevel,
    /// Whether a recent contaminated water log exists for the village.
    pub contamination_status: WaterStatus,
    /// Whether a symptom cluster was detected in the trailing window.
    pub cluster_detected: bool,
    /// Human-readable explanation of the detected cluster.
    pub cluster_reason: Option<String>,
    /// When these stats were computed.
    pub last_updated: DateTime<Utc>,
}

/// District-wide rollup over the known villages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DistrictAggregates {
    /// Sum of active cases over all known villages.
    pub total_active_cases: u32,
    /// Villages at `High` or `Critical` risk.
    pub high_risk_villages: u32,
    /// Villages at `Critical` risk.
    pub critical_alerts: u32,
    /// Villages whose water supply is currently contaminated.
    pub water_incidents: u32,
    /// Direction of the case load.
    pub trend: Trend,
    /// Villages with at least one active case, in known-village order.
    pub affected_villages: Vec<String>,
}

impl DistrictAggregates {
    /// The all-zero baseline for a district with no data.
    pub const fn baseline() -> Self {
        Self {
            total_active_cases: 0,
            high_risk_villages: 0,
            critical_alerts: 0,
            water_incidents: 0,
            trend: Trend::Decreasing,
            affected_villages: Vec::new(),
        }
    }
}

impl Default for DistrictAggregates {
    fn default() -> Self {
        Self::baseline()
    }
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

/// A tracked case cluster and its response lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cluster {
    /// Unique cluster identifier.
    pub id: ClusterId,
    /// The affected village.
    pub village: String,
    /// Village risk score at the moment the cluster was recorded. Not kept
    /// in sync with later recomputes.
    pub risk_score: u32,
    /// Number of cases attributed to the cluster.
    pub cases: u32,
    /// Current lifecycle status.
    pub status: ClusterStatus,
    /// When the cluster was recorded.
    pub date_detected: DateTime<Utc>,
}

impl Cluster {
    /// Create a newly detected cluster.
    pub fn detected(village: String, risk_score: u32, cases: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: ClusterId::new(),
            village,
            risk_score,
            cases,
            status: ClusterStatus::Detected,
            date_detected: now,
        }
    }

    /// Move `Detected` to `Verified`. Returns `false` if not allowed.
    pub const fn verify(&mut self) -> bool {
        if self.status.can_verify() {
            self.status = ClusterStatus::Verified;
            true
        } else {
            false
        }
    }

    /// Move `Detected` or `Verified` to `ResponseSent`. Returns `false` if
    /// not allowed.
    pub const fn dispatch(&mut self) -> bool {
        if self.status.can_dispatch() {
            self.status = ClusterStatus::ResponseSent;
            true
        } else {
            false
        }
    }

    /// Move `ResponseSent` to `Resolved`. Returns `false` if not allowed.
    pub const fn resolve(&mut self) -> bool {
        if self.status.can_resolve() {
            self.status = ClusterStatus::Resolved;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Resources, PHC metrics, alerts
// ---------------------------------------------------------------------------

/// Stock level of a medical supply line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceStock {
    /// Item name (unique within the resource list).
    pub item: String,
    /// Units currently in stock. Adjustments may take this below zero.
    pub current_stock: i64,
    /// Units the district should hold.
    pub required_stock: i64,
    /// Unit label (e.g. "packets").
    pub unit: String,
    /// Status assigned at creation; not recomputed on adjustment.
    pub status: StockStatus,
}

impl ResourceStock {
    /// Add `delta` to the current stock, saturating at the `i64` bounds.
    ///
    /// `status` is deliberately left as-is.
    pub const fn adjust(&mut self, delta: i64) {
        self.current_stock = self.current_stock.saturating_add(delta);
    }
}

/// Static snapshot of a Primary Health Centre's capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhcMetric {
    /// Name of the health centre.
    pub phc: String,
    /// Villages in the centre's catchment.
    pub villages_covered: Vec<String>,
    /// Staff currently on duty.
    pub staff_on_duty: u32,
    /// Free inpatient beds.
    pub beds_available: u32,
    /// Referrals waiting for transport or review.
    pub pending_referrals: u32,
}

/// A single entry in the alert log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Severity of the alert.
    pub severity: AlertSeverity,
    /// Free-text message.
    pub message: String,
    /// When the alert was raised.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> Cluster {
        Cluster::detected(String::from("Majuli"), 72, 8, Utc::now())
    }

    #[test]
    fn dispatch_then_resolve() {
        let mut c = cluster();
        assert!(c.dispatch());
        assert_eq!(c.status, ClusterStatus::ResponseSent);
        assert!(c.resolve());
        assert_eq!(c.status, ClusterStatus::Resolved);
    }

    #[test]
    fn resolve_requires_response_sent() {
        let mut c = cluster();
        assert!(!c.resolve());
        assert_eq!(c.status, ClusterStatus::Detected);
    }

    #[test]
    fn resolved_cluster_cannot_be_dispatched_again() {
        let mut c = cluster();
        assert!(c.dispatch());
        assert!(c.resolve());
        assert!(!c.dispatch());
        assert!(!c.verify());
        assert_eq!(c.status, ClusterStatus::Resolved);
    }

    #[test]
    fn verified_cluster_can_be_dispatched() {
        let mut c = cluster();
        assert!(c.verify());
        assert!(c.dispatch());
    }

    #[test]
    fn adjust_leaves_status_alone() {
        let mut stock = ResourceStock {
            item: String::from("ORS packets"),
            current_stock: 10,
            required_stock: 200,
            unit: String::from("packets"),
            status: StockStatus::Critical,
        };
        stock.adjust(500);
        assert_eq!(stock.current_stock, 510);
        assert_eq!(stock.status, StockStatus::Critical);
        stock.adjust(-600);
        assert_eq!(stock.current_stock, -90);
    }

    #[test]
    fn baseline_district_is_all_zero() {
        let d = DistrictAggregates::baseline();
        assert_eq!(d.total_active_cases, 0);
        assert_eq!(d.high_risk_villages, 0);
        assert_eq!(d.critical_alerts, 0);
        assert_eq!(d.water_incidents, 0);
        assert_eq!(d.trend, Trend::Decreasing);
        assert!(d.affected_villages.is_empty());
    }
}
