//! Village and district rollups.
//!
//! [`AggregationEngine`] composes [`RiskEngine`] outputs into
//! [`VillageStats`] and folds those into [`DistrictAggregates`]. Only the
//! externally supplied village list is visible to rollups; events for any
//! other village are ignored here.

use std::collections::BTreeSet;

use arogya_types::{
    CaseRecord, DistrictAggregates, RiskLevel, Trend, VillageStats, WaterLog, WaterStatus,
};
use chrono::{DateTime, Utc};

use crate::risk::{RiskEngine, count_u32};

/// Summed active cases above which the trend is [`Trend::Increasing`].
const INCREASING_ABOVE: u32 = 10;

/// Pure rollup of raw events into village and district read models.
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    risk: RiskEngine,
}

impl AggregationEngine {
    /// Create an aggregation engine on top of `risk`.
    pub const fn new(risk: RiskEngine) -> Self {
        Self { risk }
    }

    /// The underlying risk engine.
    pub const fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    /// Build the stats for a single village.
    pub fn aggregate_village(
        &self,
        village: &str,
        cases: &[CaseRecord],
        water_logs: &[WaterLog],
        now: DateTime<Utc>,
    ) -> VillageStats {
        let total_cases = count_u32(cases.iter().filter(|c| c.village == village).count());
        let assessment = self
            .risk
            .calculate_village_risk_score(cases, water_logs, village, now);

        VillageStats {
            village: village.to_owned(),
            total_cases,
            active_cases: total_cases,
            risk_score: assessment.score,
            risk_level: assessment.level,
            contamination_status: if assessment.water.is_unsafe {
                WaterStatus::Contaminated
            } else {
                WaterStatus::Safe
            },
            cluster_detected: assessment.cluster.detected,
            cluster_reason: assessment.cluster.reason,
            last_updated: now,
        }
    }

    /// Build stats for every distinct village in `villages`, in list order.
    ///
    /// A village listed twice appears once.
    pub fn aggregate_villages(
        &self,
        villages: &[String],
        cases: &[CaseRecord],
        water_logs: &[WaterLog],
        now: DateTime<Utc>,
    ) -> Vec<VillageStats> {
        let mut seen = BTreeSet::new();
        villages
            .iter()
            .filter(|v| seen.insert(v.as_str()))
            .map(|v| self.aggregate_village(v, cases, water_logs, now))
            .collect()
    }

    /// Fold per-village stats into the district summary.
    pub fn summarize(stats: &[VillageStats]) -> DistrictAggregates {
        let mut district = DistrictAggregates::baseline();
        for s in stats {
            district.total_active_cases = district.total_active_cases.saturating_add(s.active_cases);
            if s.risk_level.is_high_risk() {
                district.high_risk_villages = district.high_risk_villages.saturating_add(1);
            }
            if s.risk_level == RiskLevel::Critical {
                district.critical_alerts = district.critical_alerts.saturating_add(1);
            }
            if s.contamination_status == WaterStatus::Contaminated {
                district.water_incidents = district.water_incidents.saturating_add(1);
            }
            if s.active_cases > 0 {
                district.affected_villages.push(s.village.clone());
            }
        }
        district.trend = trend_for(district.total_active_cases);
        district
    }

    /// Roll the known villages up into the district summary.
    pub fn aggregate_district(
        &self,
        villages: &[String],
        cases: &[CaseRecord],
        water_logs: &[WaterLog],
        now: DateTime<Utc>,
    ) -> DistrictAggregates {
        Self::summarize(&self.aggregate_villages(villages, cases, water_logs, now))
    }
}

/// Direction of the district caseload.
pub const fn trend_for(total_active_cases: u32) -> Trend {
    if total_active_cases > INCREASING_ABOVE {
        Trend::Increasing
    } else if total_active_cases > 0 {
        Trend::Stable
    } else {
        Trend::Decreasing
    }
}
