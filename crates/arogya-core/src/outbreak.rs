//! Scripted outbreak scenario for demos and drills.
//!
//! An [`OutbreakScenario`] is a finite, deterministic sequence of
//! [`OutbreakStep`]s: `case_count` cholera-like case reports for one
//! village, then one contaminated water report, then a cluster declaration
//! carrying an alert message. It does not touch time or state; the async
//! driver in [`runner`](crate::runner) paces and applies the steps.
//!
//! [`OutbreakControl`] is the shared handle used to pause, resume, or
//! cancel a running outbreak.

use std::sync::atomic::{AtomicBool, Ordering};

use arogya_types::{CaseReport, WaterReport, WaterStatus};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Notify;

use crate::config::OutbreakConfig;

/// Symptom present in every synthetic case.
const PRIMARY_SYMPTOM: &str = "Diarrhea";

/// Symptoms each synthetic case may additionally carry.
const SECONDARY_SYMPTOMS: [&str; 3] = ["Vomiting", "Dehydration", "Stomach Pain"];

/// Chance that a secondary symptom is included.
const SECONDARY_PROBABILITY: f64 = 0.5;

/// Water source reported contaminated by the scenario.
const OUTBREAK_SOURCE: &str = "outbreak-well-1";

/// One unit of work in an outbreak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutbreakStep {
    /// Submit a synthetic case report.
    Case(CaseReport),
    /// Submit a synthetic water report.
    Water(WaterReport),
    /// Declare a cluster for `village` and raise `alert`.
    DeclareCluster {
        /// Village the cluster belongs to.
        village: String,
        /// Critical alert message raised with the cluster.
        alert: String,
    },
}

/// Completed and total step counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Steps handed out so far.
    pub completed: u32,
    /// Steps in the whole scenario.
    pub total: u32,
}

/// Deterministic outbreak step generator.
#[derive(Debug, Clone)]
pub struct OutbreakScenario {
    village: String,
    case_count: u32,
    emitted: u32,
    rng: SmallRng,
}

impl OutbreakScenario {
    /// Create a scenario of `case_count` cases in `village`, with symptom
    /// mixes drawn from `seed`.
    pub fn new(village: impl Into<String>, case_count: u32, seed: u64) -> Self {
        Self {
            village: village.into(),
            case_count,
            emitted: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a scenario from configuration.
    pub fn from_config(config: &OutbreakConfig) -> Self {
        Self::new(config.village.clone(), config.case_count, config.seed)
    }

    /// The targeted village.
    pub fn village(&self) -> &str {
        &self.village
    }

    /// Steps handed out so far against the scenario length.
    pub const fn progress(&self) -> Progress {
        Progress {
            completed: self.emitted,
            total: self.total_steps(),
        }
    }

    /// Whether every step has been handed out.
    pub const fn is_finished(&self) -> bool {
        self.emitted >= self.total_steps()
    }

    /// Produce the next step, or `None` once the scenario is exhausted.
    pub fn next_step(&mut self) -> Option<OutbreakStep> {
        let step = if self.emitted < self.case_count {
            OutbreakStep::Case(self.synthetic_case())
        } else if self.emitted == self.case_count {
            OutbreakStep::Water(WaterReport::new(
                OUTBREAK_SOURCE,
                WaterStatus::Contaminated,
                self.village.clone(),
            ))
        } else if self.emitted == self.case_count.saturating_add(1) {
            OutbreakStep::DeclareCluster {
                village: self.village.clone(),
                alert: format!(
                    "Suspected cholera outbreak in {}: {} diarrheal cases and contaminated water at {OUTBREAK_SOURCE}",
                    self.village, self.case_count
                ),
            }
        } else {
            return None;
        };
        self.emitted = self.emitted.saturating_add(1);
        Some(step)
    }

    const fn total_steps(&self) -> u32 {
        self.case_count.saturating_add(2)
    }

    fn synthetic_case(&mut self) -> CaseReport {
        let mut symptoms = vec![PRIMARY_SYMPTOM.to_owned()];
        for symptom in SECONDARY_SYMPTOMS {
            if self.rng.random_bool(SECONDARY_PROBABILITY) {
                symptoms.push(symptom.to_owned());
            }
        }
        CaseReport {
            village: self.village.clone(),
            symptoms,
            diagnosis: Some(String::from("Suspected cholera")),
        }
    }
}

impl Iterator for OutbreakScenario {
    type Item = OutbreakStep;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }
}

/// Shared pause/cancel state for a running outbreak.
///
/// Wrap in an `Arc` to share between the driver and whoever controls it.
#[derive(Debug, Default)]
pub struct OutbreakControl {
    paused: AtomicBool,
    cancelled: AtomicBool,
    resume_notify: Notify,
}

impl OutbreakControl {
    /// Create a control in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the outbreak is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Hold the driver before its next step.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Let a paused driver continue.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Stop the driver before its next step. Also releases a paused driver.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.resume();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait until the outbreak is no longer paused.
    ///
    /// Returns immediately if not paused.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn step_order_is_cases_then_water_then_cluster() {
        let steps: Vec<_> = OutbreakScenario::new("Majuli", 8, 42).collect();
        assert_eq!(steps.len(), 10);
        assert!(steps.iter().take(8).all(|s| matches!(s, OutbreakStep::Case(_))));
        assert!(matches!(
            steps.get(8),
            Some(OutbreakStep::Water(w)) if w.status == WaterStatus::Contaminated && w.village == "Majuli"
        ));
        assert!(matches!(
            steps.get(9),
            Some(OutbreakStep::DeclareCluster { village, .. }) if village == "Majuli"
        ));
    }

    #[test]
    fn every_case_leads_with_diarrhea() {
        for step in OutbreakScenario::new("Majuli", 20, 7) {
            if let OutbreakStep::Case(report) = step {
                assert_eq!(report.symptoms.first().unwrap(), PRIMARY_SYMPTOM);
                assert!(report.symptoms.len() <= 4);
                assert!(report.symptoms.iter().skip(1).all(|s| SECONDARY_SYMPTOMS.contains(&s.as_str())));
            }
        }
    }

    #[test]
    fn same_seed_same_steps() {
        let a: Vec<_> = OutbreakScenario::new("Majuli", 8, 99).collect();
        let b: Vec<_> = OutbreakScenario::new("Majuli", 8, 99).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn progress_tracks_emitted_steps() {
        let mut scenario = OutbreakScenario::new("Majuli", 2, 1);
        assert_eq!(scenario.progress(), Progress { completed: 0, total: 4 });
        let _ = scenario.next_step();
        assert_eq!(scenario.progress().completed, 1);
        while scenario.next_step().is_some() {}
        assert!(scenario.is_finished());
        assert!(scenario.next_step().is_none());
        assert_eq!(scenario.progress(), Progress { completed: 4, total: 4 });
    }

    #[tokio::test]
    async fn cancel_releases_a_paused_waiter() {
        let control = OutbreakControl::new();
        control.pause();
        assert!(control.is_paused());
        control.cancel();
        control.wait_if_paused().await;
        assert!(control.is_cancelled());
        assert!(!control.is_paused());
    }
}
