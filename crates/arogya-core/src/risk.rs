//! Per-village risk scoring.
//!
//! The [`RiskEngine`] is pure: every method reads only the slices passed in
//! plus the explicit `now`, and every method is total. Empty input yields a
//! zero score, no cluster, and safe water.
//!
//! # Scoring
//!
//! ```text
//! score = case_weight * cases
//!       + sum(symptom weight for every symptom occurrence)
//!       + cluster_bonus   (if a cluster is detected)
//!       + water_bonus     (if recent contamination exists)
//! clamped to max_score
//! ```
//!
//! All sums saturate, so the score never overflows.

use std::collections::BTreeMap;

use arogya_types::{CaseRecord, RiskLevel, WaterLog, WaterStatus};
use chrono::{DateTime, Duration, Utc};

use crate::config::RiskConfig;

/// Outcome of cluster detection for one village.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClusterSignal {
    /// Whether a symptom crossed the cluster threshold inside the window.
    pub detected: bool,
    /// Human-readable explanation naming the symptom and case count.
    pub reason: Option<String>,
}

/// Outcome of water-risk analysis for one village.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WaterSignal {
    /// Whether any contaminated log falls inside the window.
    pub is_unsafe: bool,
    /// How many contaminated logs were found, when any were.
    pub details: Option<String>,
}

/// Score and level for one village, plus the signals that fed the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    /// Clamped risk score.
    pub score: u32,
    /// Level derived from `score`.
    pub level: RiskLevel,
    /// Cluster signal used for the bonus.
    pub cluster: ClusterSignal,
    /// Water signal used for the bonus.
    pub water: WaterSignal,
}

/// Stateless risk calculator holding immutable tuning parameters.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    /// Create an engine with the given parameters.
    pub const fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// The tuning parameters in use.
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Look for a burst of one symptom in `village` within the cluster
    /// window ending at `now`.
    ///
    /// Nothing is tallied until the window holds `cluster_min_cases` cases.
    /// When several symptoms cross the threshold the first one seen in input
    /// order is reported.
    pub fn detect_clustering(
        &self,
        cases: &[CaseRecord],
        village: &str,
        now: DateTime<Utc>,
    ) -> ClusterSignal {
        let since = window_start(now, Duration::hours(i64::from(self.config.cluster_window_hours)));
        let recent: Vec<&CaseRecord> = cases
            .iter()
            .filter(|c| c.village == village && in_window(c.timestamp, since, now))
            .collect();

        let recent_count = count_u32(recent.len());
        if recent_count < self.config.cluster_min_cases {
            return ClusterSignal::default();
        }

        let mut tally: BTreeMap<&str, u32> = BTreeMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for symptom in recent.iter().flat_map(|c| c.symptoms.iter()) {
            let count = tally.entry(symptom.as_str()).or_insert_with(|| {
                first_seen.push(symptom.as_str());
                0
            });
            *count = count.saturating_add(1);
        }

        let hit = first_seen.into_iter().find_map(|symptom| {
            tally
                .get(symptom)
                .copied()
                .filter(|n| *n >= self.config.cluster_symptom_threshold)
                .map(|n| (symptom, n))
        });

        match hit {
            Some((symptom, occurrences)) => ClusterSignal {
                detected: true,
                reason: Some(format!(
                    "{symptom} reported {occurrences} times across {recent_count} cases in the last {}h",
                    self.config.cluster_window_hours
                )),
            },
            None => ClusterSignal::default(),
        }
    }

    /// Check for contaminated water in `village` within the water window
    /// ending at `now`.
    pub fn analyze_water_risk(
        &self,
        water_logs: &[WaterLog],
        village: &str,
        now: DateTime<Utc>,
    ) -> WaterSignal {
        let since = window_start(now, Duration::days(i64::from(self.config.water_window_days)));
        let contaminated = count_u32(
            water_logs
                .iter()
                .filter(|l| {
                    l.village == village
                        && l.status == WaterStatus::Contaminated
                        && in_window(l.timestamp, since, now)
                })
                .count(),
        );

        if contaminated == 0 {
            return WaterSignal::default();
        }
        WaterSignal {
            is_unsafe: true,
            details: Some(format!(
                "{contaminated} contaminated water report(s) in the last {} days",
                self.config.water_window_days
            )),
        }
    }

    /// Compute the clamped risk score and level for `village`.
    pub fn calculate_village_risk_score(
        &self,
        cases: &[CaseRecord],
        water_logs: &[WaterLog],
        village: &str,
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let mut case_count: u32 = 0;
        let mut symptom_points: u32 = 0;
        for case in cases.iter().filter(|c| c.village == village) {
            case_count = case_count.saturating_add(1);
            for symptom in &case.symptoms {
                symptom_points = symptom_points.saturating_add(self.config.symptom_weight(symptom));
            }
        }

        let cluster = self.detect_clustering(cases, village, now);
        let water = self.analyze_water_risk(water_logs, village, now);

        let mut raw = self
            .config
            .case_weight
            .saturating_mul(case_count)
            .saturating_add(symptom_points);
        if cluster.detected {
            raw = raw.saturating_add(self.config.cluster_bonus);
        }
        if water.is_unsafe {
            raw = raw.saturating_add(self.config.water_bonus);
        }

        let score = raw.min(self.config.max_score);
        RiskAssessment {
            score,
            level: self.classify(score),
            cluster,
            water,
        }
    }

    /// Map a score onto a [`RiskLevel`] using the configured thresholds.
    pub const fn classify(&self, score: u32) -> RiskLevel {
        let t = &self.config.thresholds;
        if score >= t.critical {
            RiskLevel::Critical
        } else if score >= t.high {
            RiskLevel::High
        } else if score >= t.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

fn window_start(now: DateTime<Utc>, width: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(width)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn in_window(at: DateTime<Utc>, since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    since <= at && at <= now
}

pub(crate) fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
