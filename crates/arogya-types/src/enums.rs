//! Enumeration types for the Arogya surveillance engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Risk classification
// ---------------------------------------------------------------------------

/// Ordinal risk classification of a village, derived from its risk score.
///
/// Variants are declared in ascending order of severity so that the derived
/// [`Ord`] matches the escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RiskLevel {
    /// Background level; no action expected.
    Low,
    /// Elevated; worth watching.
    Medium,
    /// Counted towards the district's high-risk villages.
    High,
    /// Counted as a critical alert at district level.
    Critical,
}

impl RiskLevel {
    /// Whether this level counts towards `high_risk_villages` (High or Critical).
    pub const fn is_high_risk(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Safety status of a water source, or of a village's water supply overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WaterStatus {
    /// No recent contamination.
    #[default]
    Safe,
    /// Contamination observed.
    Contaminated,
}

/// Direction of the district-wide case load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Trend {
    /// More than ten active cases across the district.
    Increasing,
    /// Between one and ten active cases.
    Stable,
    /// No active cases.
    Decreasing,
}

// ---------------------------------------------------------------------------
// Cluster lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of a case cluster.
///
/// Transitions only move forward:
///
/// ```text
/// Detected ──► Verified ──► ResponseSent ──► Resolved
///     └───────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ClusterStatus {
    /// Flagged by detection or declared manually.
    Detected,
    /// Confirmed by a field team.
    Verified,
    /// A response team has been dispatched.
    ResponseSent,
    /// The cluster is closed.
    Resolved,
}

impl ClusterStatus {
    /// Whether a response team may be dispatched from this status.
    pub const fn can_dispatch(self) -> bool {
        matches!(self, Self::Detected | Self::Verified)
    }

    /// Whether the cluster may be verified from this status.
    pub const fn can_verify(self) -> bool {
        matches!(self, Self::Detected)
    }

    /// Whether the cluster may be resolved from this status.
    pub const fn can_resolve(self) -> bool {
        matches!(self, Self::ResponseSent)
    }
}

// ---------------------------------------------------------------------------
// Resources and alerts
// ---------------------------------------------------------------------------

/// Stock status of a medical supply line.
///
/// Set when the stock record is created. Adjusting the stock level does not
/// recompute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StockStatus {
    /// Stock is at or near the required level.
    Good,
    /// Stock is running low.
    Low,
    /// Stock is critically short.
    Critical,
}

/// Severity of an entry in the alert log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertSeverity {
    /// Informational.
    Info,
    /// Something is off but not critical.
    Warning,
    /// Immediate attention required.
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_order_by_severity() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn only_high_and_critical_are_high_risk() {
        assert!(!RiskLevel::Low.is_high_risk());
        assert!(!RiskLevel::Medium.is_high_risk());
        assert!(RiskLevel::High.is_high_risk());
        assert!(RiskLevel::Critical.is_high_risk());
    }

    #[test]
    fn cluster_lifecycle_never_moves_backwards() {
        assert!(ClusterStatus::Detected.can_dispatch());
        assert!(ClusterStatus::Verified.can_dispatch());
        assert!(!ClusterStatus::ResponseSent.can_dispatch());
        assert!(!ClusterStatus::Resolved.can_dispatch());

        assert!(ClusterStatus::Detected.can_verify());
        assert!(!ClusterStatus::Verified.can_verify());

        assert!(ClusterStatus::ResponseSent.can_resolve());
        assert!(!ClusterStatus::Detected.can_resolve());
        assert!(!ClusterStatus::Resolved.can_resolve());
    }

    #[test]
    fn trend_serializes_lowercase() {
        let json = serde_json::to_string(&Trend::Increasing).unwrap_or_default();
        assert_eq!(json, "\"increasing\"");
    }
}
