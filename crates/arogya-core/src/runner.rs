//! Async driver for scripted outbreaks.
//!
//! [`run_outbreak`] pulls steps from an [`OutbreakScenario`], applies each
//! through the controller, and sleeps between steps. Before every step it
//! honours the shared [`OutbreakControl`]:
//!
//! - **Pause**: wait until resumed
//! - **Cancel**: stop cleanly, keeping the steps already applied

use std::time::Duration;

use arogya_store::KeyValueStore;
use arogya_types::ClusterId;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::controller::{ControllerError, StepOutcome, SurveillanceController};
use crate::outbreak::{OutbreakControl, OutbreakScenario, Progress};

/// Why an outbreak run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutbreakEndReason {
    /// Every step was applied.
    Completed,
    /// Cancelled through [`OutbreakControl::cancel`].
    Cancelled,
}

/// Result of an outbreak run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutbreakResult {
    /// Why the run ended.
    pub end_reason: OutbreakEndReason,
    /// Number of steps applied.
    pub steps_applied: u32,
    /// The declared cluster, if the run got that far.
    pub cluster_id: Option<ClusterId>,
}

/// Callback invoked after each applied step.
pub trait OutbreakCallback: Send {
    /// Called after a step is applied.
    fn on_step(&mut self, outcome: &StepOutcome, progress: Progress);
}

/// A no-op callback.
pub struct NoOpCallback;

impl OutbreakCallback for NoOpCallback {
    fn on_step(&mut self, _outcome: &StepOutcome, _progress: Progress) {}
}

/// Run `scenario` against `controller` until it completes or is cancelled.
///
/// `interval` is slept between consecutive steps, not after the last one.
///
/// # Errors
///
/// Returns [`ControllerError`] if a step is rejected or cannot be
/// persisted. Steps applied before the failure stay applied.
pub async fn run_outbreak<S: KeyValueStore, C: Clock>(
    controller: &SurveillanceController<S, C>,
    mut scenario: OutbreakScenario,
    control: &OutbreakControl,
    interval: Duration,
    callback: &mut dyn OutbreakCallback,
) -> Result<OutbreakResult, ControllerError> {
    let mut steps_applied: u32 = 0;
    let mut cluster_id = None;

    info!(
        village = scenario.village(),
        total_steps = scenario.progress().total,
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "Outbreak starting"
    );

    loop {
        if control.is_paused() {
            info!("Outbreak paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Outbreak resumed");
        }

        if control.is_cancelled() {
            warn!(steps_applied, "Outbreak cancelled");
            return Ok(OutbreakResult {
                end_reason: OutbreakEndReason::Cancelled,
                steps_applied,
                cluster_id,
            });
        }

        let Some(step) = scenario.next_step() else {
            info!(steps_applied, cluster_id = ?cluster_id, "Outbreak completed");
            return Ok(OutbreakResult {
                end_reason: OutbreakEndReason::Completed,
                steps_applied,
                cluster_id,
            });
        };

        let outcome = controller.apply_outbreak_step(step).await?;
        steps_applied = steps_applied.saturating_add(1);
        if let StepOutcome::ClusterDeclared(id) = outcome {
            cluster_id = Some(id);
        }
        callback.on_step(&outcome, scenario.progress());

        if !scenario.is_finished() && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
}

impl<S: KeyValueStore, C: Clock> SurveillanceController<S, C> {
    /// Run the configured outbreak with the configured pacing.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if a step is rejected or cannot be
    /// persisted.
    pub async fn simulate_outbreak(
        &self,
        control: &OutbreakControl,
    ) -> Result<OutbreakResult, ControllerError> {
        let config = self.outbreak_config();
        let scenario = OutbreakScenario::from_config(config);
        let interval = Duration::from_millis(config.step_interval_ms);
        run_outbreak(self, scenario, control, interval, &mut NoOpCallback).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::Arc;

    use arogya_store::MemoryStore;
    use arogya_types::{ClusterStatus, WaterStatus};
    use chrono::{DateTime, Duration as ChronoDuration};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SurveillanceConfig;

    fn empty_config() -> SurveillanceConfig {
        let mut config = SurveillanceConfig::default();
        config.storage.seed_on_empty = false;
        config
    }

    async fn controller() -> SurveillanceController<MemoryStore, ManualClock> {
        let clock = ManualClock::new(DateTime::UNIX_EPOCH + ChronoDuration::days(20_000));
        SurveillanceController::load(MemoryStore::new(), clock, &empty_config()).await.unwrap()
    }

    #[tokio::test]
    async fn full_run_builds_the_outbreak() {
        let controller = controller().await;
        let control = OutbreakControl::new();
        let scenario = OutbreakScenario::new("Majuli", 8, 42);

        let result = run_outbreak(&controller, scenario, &control, Duration::ZERO, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, OutbreakEndReason::Completed);
        assert_eq!(result.steps_applied, 10);

        let cases = controller.cases().await;
        assert_eq!(cases.len(), 8);
        assert!(cases.iter().all(|c| c.village == "Majuli"));

        let logs = controller.water_logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs.first().unwrap().status, WaterStatus::Contaminated);

        let clusters = controller.clusters().await;
        assert_eq!(clusters.len(), 1);
        let cluster = clusters.first().unwrap();
        assert_eq!(Some(cluster.id), result.cluster_id);
        assert_eq!(cluster.status, ClusterStatus::Detected);
        assert_eq!(cluster.cases, 8);

        let stats = controller.village_stats().await;
        let majuli = stats.get("Majuli").unwrap();
        assert!(majuli.cluster_detected);
        assert_eq!(cluster.risk_score, majuli.risk_score);

        let alerts = controller.alerts().await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts.first().unwrap().message.contains("Majuli"));
    }

    #[tokio::test]
    async fn cancelled_before_start_applies_nothing() {
        let controller = controller().await;
        let control = OutbreakControl::new();
        control.cancel();

        let result = run_outbreak(
            &controller,
            OutbreakScenario::new("Majuli", 8, 42),
            &control,
            Duration::ZERO,
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, OutbreakEndReason::Cancelled);
        assert_eq!(result.steps_applied, 0);
        assert!(controller.cases().await.is_empty());
    }

    #[tokio::test]
    async fn callback_sees_every_step() {
        struct Recorder {
            seen: Vec<Progress>,
        }
        impl OutbreakCallback for Recorder {
            fn on_step(&mut self, _outcome: &StepOutcome, progress: Progress) {
                self.seen.push(progress);
            }
        }

        let controller = controller().await;
        let mut recorder = Recorder { seen: Vec::new() };
        let _ = run_outbreak(
            &controller,
            OutbreakScenario::new("Majuli", 3, 1),
            &OutbreakControl::new(),
            Duration::ZERO,
            &mut recorder,
        )
        .await
        .unwrap();

        let completed: Vec<u32> = recorder.seen.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_run_stops_between_steps() {
        let controller = Arc::new(controller().await);
        let control = Arc::new(OutbreakControl::new());

        let task = {
            let controller = Arc::clone(&controller);
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                run_outbreak(
                    &controller,
                    OutbreakScenario::new("Majuli", 8, 42),
                    &control,
                    Duration::from_millis(800),
                    &mut NoOpCallback,
                )
                .await
            })
        };

        // Steps land at t=0, 800, 1600; cancel lands before the fourth.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        control.cancel();

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.end_reason, OutbreakEndReason::Cancelled);
        assert_eq!(result.steps_applied, 3);
        assert_eq!(controller.cases().await.len(), 3);
        assert!(result.cluster_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_the_run_until_resumed() {
        let controller = Arc::new(controller().await);
        let control = Arc::new(OutbreakControl::new());
        control.pause();

        let task = {
            let controller = Arc::clone(&controller);
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                run_outbreak(
                    &controller,
                    OutbreakScenario::new("Majuli", 2, 42),
                    &control,
                    Duration::from_millis(100),
                    &mut NoOpCallback,
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(controller.cases().await.is_empty());

        control.resume();
        let result = task.await.unwrap().unwrap();
        assert_eq!(result.end_reason, OutbreakEndReason::Completed);
        assert_eq!(result.steps_applied, 4);
    }

    #[tokio::test]
    async fn simulate_outbreak_uses_configured_village() {
        let mut config = empty_config();
        config.outbreak.village = String::from("Garamur");
        config.outbreak.case_count = 5;
        config.outbreak.step_interval_ms = 0;
        let clock = ManualClock::new(DateTime::UNIX_EPOCH + ChronoDuration::days(20_000));
        let controller = SurveillanceController::load(MemoryStore::new(), clock, &config).await.unwrap();

        let result = controller.simulate_outbreak(&OutbreakControl::new()).await.unwrap();
        assert_eq!(result.steps_applied, 7);
        let stats = controller.village_stats().await;
        assert_eq!(stats.get("Garamur").unwrap().total_cases, 5);
        assert!(stats.get("Garamur").unwrap().cluster_detected);
    }
}
