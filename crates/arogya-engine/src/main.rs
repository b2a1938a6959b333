//! Surveillance engine binary for Arogya.
//!
//! Wires the configured key-value store into a [`SurveillanceController`],
//! logs the initial read model, and optionally runs the configured outbreak
//! drill. `Ctrl-C` cancels a running drill between steps.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `arogya-config.yaml` (or `AROGYA_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the configured store (in-memory or Dragonfly)
//! 4. Load persisted events and compute the read model
//! 5. Start the read-model update logger
//! 6. Run the outbreak drill, if enabled
//! 7. Log the final district summary
//!
//! [`SurveillanceController`]: arogya_core::controller::SurveillanceController

mod error;
mod log_callback;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arogya_core::clock::SystemClock;
use arogya_core::config::{LogFormat, LoggingConfig, StorageBackend, SurveillanceConfig};
use arogya_core::controller::SurveillanceController;
use arogya_core::outbreak::{OutbreakControl, OutbreakScenario};
use arogya_core::runner;
use arogya_store::{DragonflyStore, KeyValueStore, MemoryStore};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LogCallback;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "arogya-config.yaml";

/// Application entry point for the surveillance engine.
///
/// # Errors
///
/// Returns an error if configuration, the store connection, or the
/// outbreak drill fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("arogya-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        district = config.district.name,
        villages = config.district.villages.len(),
        backend = ?config.storage.backend,
        key_prefix = config.storage.key_prefix,
        "Engine configuration"
    );

    // 3. Connect the store and hand off to the generic runner.
    match config.storage.backend {
        StorageBackend::Memory => run(MemoryStore::new(), &config).await?,
        StorageBackend::Dragonfly => {
            info!(url = config.storage.dragonfly_url, "Connecting to Dragonfly");
            let store = DragonflyStore::connect(&config.storage.dragonfly_url).await?;
            run(store, &config).await?;
        }
    }

    info!("arogya-engine shutdown complete");
    Ok(())
}

async fn run<S: KeyValueStore>(
    store: S,
    config: &SurveillanceConfig,
) -> Result<(), EngineError> {
    // 4. Load events and compute the read model.
    let controller = Arc::new(SurveillanceController::load(store, SystemClock, config).await?);
    log_read_model(&controller).await;

    // 5. Log every read-model update.
    let mut updates = controller.subscribe();
    let _update_logger = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => info!(
                    sequence = update.sequence,
                    trigger = ?update.trigger,
                    total_active_cases = update.district.total_active_cases,
                    high_risk_villages = update.district.high_risk_villages,
                    critical_alerts = update.district.critical_alerts,
                    water_incidents = update.district.water_incidents,
                    trend = ?update.district.trend,
                    "Read model updated"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Update logger lagged, skipping ahead");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 6. Run the outbreak drill.
    if config.outbreak.run_on_startup {
        let control = Arc::new(OutbreakControl::new());
        {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Ctrl-C received, cancelling outbreak");
                    control.cancel();
                }
            });
        }

        let scenario = OutbreakScenario::from_config(&config.outbreak);
        let mut callback = LogCallback::new(config.outbreak.village.clone());
        let result = runner::run_outbreak(
            &controller,
            scenario,
            &control,
            Duration::from_millis(config.outbreak.step_interval_ms),
            &mut callback,
        )
        .await?;
        info!(
            end_reason = ?result.end_reason,
            steps_applied = result.steps_applied,
            cluster_id = ?result.cluster_id,
            "Outbreak drill finished"
        );
    } else {
        debug!("Outbreak drill disabled");
    }

    // 7. Log the final state.
    log_read_model(&controller).await;
    Ok(())
}

/// Load the configuration from `AROGYA_CONFIG` or [`DEFAULT_CONFIG_PATH`].
///
/// Returns the path that was read, or `None` when falling back to defaults.
fn load_config() -> Result<(SurveillanceConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os("AROGYA_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SurveillanceConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SurveillanceConfig::parse("")?, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

async fn log_read_model<S: KeyValueStore>(controller: &SurveillanceController<S>) {
    let snapshot = controller.snapshot().await;
    for stats in snapshot.village_stats.values() {
        info!(
            village = stats.village,
            total_cases = stats.total_cases,
            risk_score = stats.risk_score,
            risk_level = ?stats.risk_level,
            contamination = ?stats.contamination_status,
            cluster_detected = stats.cluster_detected,
            cluster_reason = stats.cluster_reason.as_deref().unwrap_or(""),
            "Village status"
        );
    }
    let d = &snapshot.district;
    info!(
        sequence = snapshot.sequence,
        cases = snapshot.cases.len(),
        water_logs = snapshot.water_logs.len(),
        clusters = snapshot.clusters.len(),
        alerts = snapshot.alerts.len(),
        total_active_cases = d.total_active_cases,
        high_risk_villages = d.high_risk_villages,
        critical_alerts = d.critical_alerts,
        water_incidents = d.water_incidents,
        trend = ?d.trend,
        affected_villages = ?d.affected_villages,
        "District status"
    );
    match serde_json::to_string(&snapshot) {
        Ok(json) => debug!(bytes = json.len(), snapshot = %json, "Full snapshot"),
        Err(e) => warn!(error = %e, "Failed to serialize snapshot"),
    }
}
