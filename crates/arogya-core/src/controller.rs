//! The reactive surveillance controller.
//!
//! [`SurveillanceController`] owns the raw event collections and every
//! derived read model. Each command runs under one write guard:
//!
//! 1. Validate the inbound report (if any).
//! 2. Build the new collection and persist it.
//! 3. Commit it in memory only after the write succeeded.
//! 4. Recompute every village and the district from scratch.
//! 5. Broadcast a [`ReadModelUpdate`].
//!
//! Readers take the read guard, so they never observe a half-applied
//! command.

use std::collections::BTreeMap;

use arogya_store::{EventArchive, KeyValueStore, StoreError};
use arogya_types::{
    Alert, AlertSeverity, CaseId, CaseRecord, CaseReport, Cluster, ClusterId, DistrictAggregates,
    PhcMetric, ResourceStock, VillageStats, WaterLog, WaterLogId, WaterReport,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::aggregation::AggregationEngine;
use crate::alerts::AlertLog;
use crate::clock::{Clock, SystemClock};
use crate::config::{OutbreakConfig, SurveillanceConfig};
use crate::outbreak::OutbreakStep;
use crate::risk::RiskEngine;
use crate::seed;
use crate::validation::{self, ValidationError};

/// Capacity of the read-model update channel.
///
/// A subscriber that falls behind by more than this many updates receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// Errors surfaced by controller commands.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The inbound report was rejected before touching any state.
    #[error("validation failed: {source}")]
    Validation {
        /// The underlying validation error.
        #[from]
        source: ValidationError,
    },

    /// Persisting the new collection failed; nothing was applied.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// What caused a read-model recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTrigger {
    /// Initial computation after loading.
    Loaded,
    /// A case report was accepted.
    CaseAdded,
    /// A water-quality observation was accepted.
    WaterLogged,
    /// A cluster was declared.
    ClusterDeclared,
    /// A cluster moved through its lifecycle.
    ClusterUpdated,
    /// A resource stock level changed.
    ResourceUpdated,
    /// The event collections were cleared.
    Reset,
}

/// Notification broadcast after every recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadModelUpdate {
    /// Monotonic recompute counter, starting at 1 for the initial load.
    pub sequence: u64,
    /// The command that caused the recompute.
    pub trigger: UpdateTrigger,
    /// The district summary after the recompute.
    pub district: DistrictAggregates,
    /// The `now` the recompute used.
    pub computed_at: DateTime<Utc>,
}

/// A consistent copy of everything the controller exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveillanceSnapshot {
    /// Recompute counter at the time of the copy.
    pub sequence: u64,
    /// Case reports, newest first.
    pub cases: Vec<CaseRecord>,
    /// Water logs, newest first.
    pub water_logs: Vec<WaterLog>,
    /// Per-village stats keyed by village name.
    pub village_stats: BTreeMap<String, VillageStats>,
    /// District summary.
    pub district: DistrictAggregates,
    /// Tracked clusters, newest first.
    pub clusters: Vec<Cluster>,
    /// Medical supply lines.
    pub resources: Vec<ResourceStock>,
    /// Static PHC metrics.
    pub phc_metrics: Vec<PhcMetric>,
    /// Alerts, newest first.
    pub alerts: Vec<Alert>,
}

/// Outcome of one applied outbreak step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A synthetic case was added.
    CaseAdded(CaseId),
    /// A synthetic water log was added.
    WaterLogged(WaterLogId),
    /// A cluster was declared.
    ClusterDeclared(ClusterId),
}

#[derive(Debug, Default)]
struct SurveillanceState {
    cases: Vec<CaseRecord>,
    water_logs: Vec<WaterLog>,
    village_stats: BTreeMap<String, VillageStats>,
    district: DistrictAggregates,
    clusters: Vec<Cluster>,
    resources: Vec<ResourceStock>,
    alerts: AlertLog,
    sequence: u64,
}

/// Owns the event store and publishes the derived read models.
///
/// Shared by `Arc`; every method takes `&self`.
pub struct SurveillanceController<S, C = SystemClock> {
    archive: EventArchive<S>,
    clock: C,
    engine: AggregationEngine,
    villages: Vec<String>,
    outbreak: OutbreakConfig,
    phc_metrics: Vec<PhcMetric>,
    state: RwLock<SurveillanceState>,
    tx: broadcast::Sender<ReadModelUpdate>,
}

impl<S: KeyValueStore, C: Clock> SurveillanceController<S, C> {
    /// Load persisted events from `store` and compute the initial read model.
    ///
    /// A collection that is missing falls back to the seed dataset when
    /// `storage.seed_on_empty` is set. A blob that is malformed or written by
    /// an unknown schema version always falls back to the seed dataset, with
    /// a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] if the backend read itself fails.
    /// Nothing is seeded in that case, so a later write cannot overwrite
    /// the persisted collection.
    pub async fn load(
        store: S,
        clock: C,
        config: &SurveillanceConfig,
    ) -> Result<Self, ControllerError> {
        let archive = EventArchive::with_prefix(store, &config.storage.key_prefix);
        let now = clock.now();
        let seed_on_empty = config.storage.seed_on_empty;

        let cases = match archive.load_cases().await {
            Ok(Some(cases)) => cases,
            Ok(None) if seed_on_empty => {
                debug!(key = archive.cases_key(), "No persisted cases, using seed data");
                seed::cases(now)
            }
            Ok(None) => Vec::new(),
            Err(e) if is_undecodable(&e) => {
                warn!(key = archive.cases_key(), error = %e, "Persisted cases unreadable, using seed data");
                seed::cases(now)
            }
            Err(e) => return Err(e.into()),
        };

        let water_logs = match archive.load_water_logs().await {
            Ok(Some(logs)) => logs,
            Ok(None) if seed_on_empty => {
                debug!(key = archive.water_logs_key(), "No persisted water logs, using seed data");
                seed::water_logs(now)
            }
            Ok(None) => Vec::new(),
            Err(e) if is_undecodable(&e) => {
                warn!(key = archive.water_logs_key(), error = %e, "Persisted water logs unreadable, using seed data");
                seed::water_logs(now)
            }
            Err(e) => return Err(e.into()),
        };

        let state = SurveillanceState {
            cases,
            water_logs,
            clusters: if seed_on_empty { seed::clusters(now) } else { Vec::new() },
            resources: seed::resources(),
            ..SurveillanceState::default()
        };

        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let controller = Self {
            archive,
            clock,
            engine: AggregationEngine::new(RiskEngine::new(config.risk.clone())),
            villages: config.district.villages.clone(),
            outbreak: config.outbreak.clone(),
            phc_metrics: seed::phc_metrics(),
            state: RwLock::new(state),
            tx,
        };

        {
            let mut state = controller.state.write().await;
            controller.recompute(&mut state, now, UpdateTrigger::Loaded);
            info!(
                cases = state.cases.len(),
                water_logs = state.water_logs.len(),
                villages = controller.villages.len(),
                "Surveillance controller loaded"
            );
        }
        Ok(controller)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Accept a case report, stamp it, and prepend it to the case collection.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] for a malformed report, or
    /// [`ControllerError::Store`] if persisting fails. Either way no state
    /// changes.
    pub async fn add_case(&self, report: &CaseReport) -> Result<CaseRecord, ControllerError> {
        let report =
            validation::validate_case_report(report, &self.engine.risk().config().symptom_weights)?;

        let mut state = self.state.write().await;
        let now = self.clock.now();
        let record = CaseRecord {
            id: CaseId::new(),
            symptoms: report.symptoms,
            diagnosis: report.diagnosis,
            village: report.village,
            timestamp: now,
        };

        let cases = prepended(record.clone(), &state.cases);
        self.archive.save_cases(&cases).await?;
        state.cases = cases;

        info!(
            case_id = %record.id,
            village = %record.village,
            symptoms = record.symptoms.len(),
            "Case added"
        );
        self.recompute(&mut state, now, UpdateTrigger::CaseAdded);
        Ok(record)
    }

    /// Accept a water-quality observation and prepend it to the water log.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] for a malformed report, or
    /// [`ControllerError::Store`] if persisting fails. Either way no state
    /// changes.
    pub async fn log_water_quality(&self, report: &WaterReport) -> Result<WaterLog, ControllerError> {
        let report = validation::validate_water_report(report)?;

        let mut state = self.state.write().await;
        let now = self.clock.now();
        let log = WaterLog {
            id: WaterLogId::new(),
            source_id: report.source_id,
            status: report.status,
            village: report.village,
            timestamp: now,
        };

        let logs = prepended(log.clone(), &state.water_logs);
        self.archive.save_water_logs(&logs).await?;
        state.water_logs = logs;

        info!(
            water_log_id = %log.id,
            village = %log.village,
            source_id = %log.source_id,
            status = ?log.status,
            "Water quality logged"
        );
        self.recompute(&mut state, now, UpdateTrigger::WaterLogged);
        Ok(log)
    }

    /// Move a cluster from `Detected` to `Verified`.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or a cluster
    /// in any other status.
    pub async fn verify_cluster(&self, id: ClusterId) -> bool {
        self.transition_cluster(id, "verify", Cluster::verify).await
    }

    /// Send a response team: `Detected` or `Verified` becomes `ResponseSent`.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or a cluster
    /// in any other status.
    pub async fn dispatch_team(&self, id: ClusterId) -> bool {
        self.transition_cluster(id, "dispatch", Cluster::dispatch).await
    }

    /// Close a cluster: `ResponseSent` becomes `Resolved`.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or a cluster
    /// in any other status.
    pub async fn resolve_cluster(&self, id: ClusterId) -> bool {
        self.transition_cluster(id, "resolve", Cluster::resolve).await
    }

    /// Add `delta` to the stock of `item`. The stock status is left as is.
    ///
    /// Returns `false` for an unknown item.
    pub async fn update_resource(&self, item: &str, delta: i64) -> bool {
        let mut state = self.state.write().await;
        let Some(stock) = state.resources.iter_mut().find(|r| r.item == item) else {
            debug!(item, delta, "Unknown resource, ignoring update");
            return false;
        };
        stock.adjust(delta);
        info!(item, delta, current_stock = stock.current_stock, "Resource updated");

        let now = self.clock.now();
        self.recompute(&mut state, now, UpdateTrigger::ResourceUpdated);
        true
    }

    /// Create a `Detected` cluster for `village` from its current stats.
    ///
    /// The cluster's `cases` is the village's total case count at the time
    /// of declaration. A village with no stats gets a zero snapshot.
    pub async fn declare_cluster(&self, village: &str) -> ClusterId {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let id = Self::push_cluster(&mut state, village, now);
        self.recompute(&mut state, now, UpdateTrigger::ClusterDeclared);
        id
    }

    /// Clear both event collections and their persisted copies.
    ///
    /// Clusters, resources, and alerts are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Store`] if deleting the persisted copies
    /// fails; the in-memory collections are then left untouched.
    pub async fn reset_simulation(&self) -> Result<(), ControllerError> {
        let mut state = self.state.write().await;
        self.archive.clear().await?;
        state.cases.clear();
        state.water_logs.clear();

        info!("Simulation reset");
        let now = self.clock.now();
        self.recompute(&mut state, now, UpdateTrigger::Reset);
        Ok(())
    }

    /// Apply one step of a scripted outbreak.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if a synthetic report is rejected or
    /// persisting fails.
    pub async fn apply_outbreak_step(&self, step: OutbreakStep) -> Result<StepOutcome, ControllerError> {
        match step {
            OutbreakStep::Case(report) => {
                let record = self.add_case(&report).await?;
                Ok(StepOutcome::CaseAdded(record.id))
            }
            OutbreakStep::Water(report) => {
                let log = self.log_water_quality(&report).await?;
                Ok(StepOutcome::WaterLogged(log.id))
            }
            OutbreakStep::DeclareCluster { village, alert } => {
                let mut state = self.state.write().await;
                let now = self.clock.now();
                let id = Self::push_cluster(&mut state, &village, now);
                state.alerts.raise(AlertSeverity::Critical, alert, now);
                self.recompute(&mut state, now, UpdateTrigger::ClusterDeclared);
                Ok(StepOutcome::ClusterDeclared(id))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Case reports, newest first.
    pub async fn cases(&self) -> Vec<CaseRecord> {
        self.state.read().await.cases.clone()
    }

    /// Water logs, newest first.
    pub async fn water_logs(&self) -> Vec<WaterLog> {
        self.state.read().await.water_logs.clone()
    }

    /// Per-village stats keyed by village name.
    pub async fn village_stats(&self) -> BTreeMap<String, VillageStats> {
        self.state.read().await.village_stats.clone()
    }

    /// The district summary.
    pub async fn district_stats(&self) -> DistrictAggregates {
        self.state.read().await.district.clone()
    }

    /// Tracked clusters, newest first.
    pub async fn clusters(&self) -> Vec<Cluster> {
        self.state.read().await.clusters.clone()
    }

    /// Medical supply lines.
    pub async fn resources(&self) -> Vec<ResourceStock> {
        self.state.read().await.resources.clone()
    }

    /// Alerts, newest first.
    pub async fn alerts(&self) -> Vec<Alert> {
        self.state.read().await.alerts.all().to_vec()
    }

    /// Static PHC metrics.
    pub fn phc_metrics(&self) -> &[PhcMetric] {
        &self.phc_metrics
    }

    /// The known villages, as configured.
    pub fn villages(&self) -> &[String] {
        &self.villages
    }

    /// Outbreak harness settings.
    pub const fn outbreak_config(&self) -> &OutbreakConfig {
        &self.outbreak
    }

    /// One consistent copy of every read model.
    pub async fn snapshot(&self) -> SurveillanceSnapshot {
        let state = self.state.read().await;
        SurveillanceSnapshot {
            sequence: state.sequence,
            cases: state.cases.clone(),
            water_logs: state.water_logs.clone(),
            village_stats: state.village_stats.clone(),
            district: state.district.clone(),
            clusters: state.clusters.clone(),
            resources: state.resources.clone(),
            phc_metrics: self.phc_metrics.clone(),
            alerts: state.alerts.all().to_vec(),
        }
    }

    /// The underlying key-value store.
    pub const fn store(&self) -> &S {
        self.archive.store()
    }

    /// Tear down the controller and give back its store.
    pub fn into_store(self) -> S {
        self.archive.into_store()
    }

    /// Subscribe to read-model updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ReadModelUpdate> {
        self.tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn transition_cluster(
        &self,
        id: ClusterId,
        action: &'static str,
        apply: fn(&mut Cluster) -> bool,
    ) -> bool {
        let mut state = self.state.write().await;
        let Some(cluster) = state.clusters.iter_mut().find(|c| c.id == id) else {
            debug!(cluster_id = %id, action, "Unknown cluster, ignoring");
            return false;
        };
        if !apply(cluster) {
            debug!(cluster_id = %id, action, status = ?cluster.status, "Transition not allowed, ignoring");
            return false;
        }
        info!(cluster_id = %id, village = %cluster.village, status = ?cluster.status, "Cluster {action}");

        let now = self.clock.now();
        self.recompute(&mut state, now, UpdateTrigger::ClusterUpdated);
        true
    }

    /// Prepend a `Detected` cluster for `village` and return its id.
    ///
    /// `risk_score` and `cases` copy the village's current stats, so `cases`
    /// is the village's all-time case total, not just the cases behind the
    /// declaration. A village outside the district list gets zeros.
    fn push_cluster(state: &mut SurveillanceState, village: &str, now: DateTime<Utc>) -> ClusterId {
        let (risk_score, cases) = state
            .village_stats
            .get(village)
            .map_or((0, 0), |s| (s.risk_score, s.total_cases));
        let cluster = Cluster::detected(village.to_owned(), risk_score, cases, now);
        let id = cluster.id;
        info!(cluster_id = %id, village, risk_score, cases, "Cluster declared");
        state.clusters.insert(0, cluster);
        id
    }

    fn recompute(&self, state: &mut SurveillanceState, now: DateTime<Utc>, trigger: UpdateTrigger) {
        let stats = self
            .engine
            .aggregate_villages(&self.villages, &state.cases, &state.water_logs, now);
        state.district = AggregationEngine::summarize(&stats);
        state.village_stats = stats.into_iter().map(|s| (s.village.clone(), s)).collect();
        state.sequence = state.sequence.saturating_add(1);

        debug!(
            sequence = state.sequence,
            trigger = ?trigger,
            total_active_cases = state.district.total_active_cases,
            high_risk_villages = state.district.high_risk_villages,
            "Read model recomputed"
        );

        // Zero subscribers is not an error.
        let _ = self.tx.send(ReadModelUpdate {
            sequence: state.sequence,
            trigger,
            district: state.district.clone(),
            computed_at: now,
        });
    }
}

fn prepended<T: Clone>(item: T, existing: &[T]) -> Vec<T> {
    std::iter::once(item).chain(existing.iter().cloned()).collect()
}

/// Whether a load error means the blob itself is bad, as opposed to the
/// backend being unreachable.
const fn is_undecodable(err: &StoreError) -> bool {
    matches!(err, StoreError::Serialization(_) | StoreError::SchemaVersion { .. })
}
