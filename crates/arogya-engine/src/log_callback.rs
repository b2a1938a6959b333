//! Outbreak callback that reports each applied step through `tracing`.

use arogya_core::controller::StepOutcome;
use arogya_core::outbreak::Progress;
use arogya_core::runner::OutbreakCallback;
use tracing::info;

/// Logs every applied outbreak step with its progress.
pub struct LogCallback {
    village: String,
}

impl LogCallback {
    /// Create a callback for an outbreak in `village`.
    pub const fn new(village: String) -> Self {
        Self { village }
    }
}

impl OutbreakCallback for LogCallback {
    fn on_step(&mut self, outcome: &StepOutcome, progress: Progress) {
        match outcome {
            StepOutcome::CaseAdded(id) => info!(
                village = %self.village,
                case_id = %id,
                step = progress.completed,
                total = progress.total,
                "Outbreak case reported"
            ),
            StepOutcome::WaterLogged(id) => info!(
                village = %self.village,
                water_log_id = %id,
                step = progress.completed,
                total = progress.total,
                "Outbreak water contamination reported"
            ),
            StepOutcome::ClusterDeclared(id) => info!(
                village = %self.village,
                cluster_id = %id,
                step = progress.completed,
                total = progress.total,
                "Outbreak cluster declared"
            ),
        }
    }
}
