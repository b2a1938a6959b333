//! Configuration loading and typed config structures for the Arogya engine.
//!
//! The canonical configuration lives in `arogya-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file. Every
//! field has a default, so an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `arogya-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SurveillanceConfig {
    /// District name and the fixed list of known villages.
    #[serde(default)]
    pub district: DistrictConfig,

    /// Risk scoring parameters.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Persistence backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbreak demo harness settings.
    #[serde(default)]
    pub outbreak: OutbreakConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SurveillanceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DRAGONFLY_URL` overrides `storage.dragonfly_url` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as unit, not as an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.storage.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.district.villages.is_empty() {
            return Err(invalid("district.villages must list at least one village"));
        }
        if self.district.villages.iter().any(|v| v.trim().is_empty()) {
            return Err(invalid("district.villages must not contain blank names"));
        }
        self.risk.validate()?;
        if self.outbreak.case_count == 0 {
            return Err(invalid("outbreak.case_count must be at least 1"));
        }
        if self.outbreak.village.trim().is_empty() {
            return Err(invalid("outbreak.village must not be blank"));
        }
        if !self.district.villages.contains(&self.outbreak.village) {
            return Err(invalid("outbreak.village must be one of district.villages"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// District configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DistrictConfig {
    /// Human-readable district name.
    #[serde(default = "default_district_name")]
    pub name: String,

    /// The fixed list of villages the rollups cover. Events for villages
    /// outside this list are stored but invisible to rollups.
    #[serde(default = "default_villages")]
    pub villages: Vec<String>,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            name: default_district_name(),
            villages: default_villages(),
        }
    }
}

/// Risk scoring parameters.
///
/// The defaults are the reference scoring rules; changing them changes
/// every score the engine publishes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RiskConfig {
    /// Length of the trailing cluster-detection window, in hours.
    #[serde(default = "default_cluster_window_hours")]
    pub cluster_window_hours: u32,

    /// Minimum cases inside the window before symptoms are tallied.
    #[serde(default = "default_cluster_min_cases")]
    pub cluster_min_cases: u32,

    /// Occurrences of one symptom inside the window that flag a cluster.
    #[serde(default = "default_cluster_symptom_threshold")]
    pub cluster_symptom_threshold: u32,

    /// Length of the trailing water-contamination window, in days.
    #[serde(default = "default_water_window_days")]
    pub water_window_days: u32,

    /// Points added per case in the village.
    #[serde(default = "default_case_weight")]
    pub case_weight: u32,

    /// Points added when a cluster is detected.
    #[serde(default = "default_cluster_bonus")]
    pub cluster_bonus: u32,

    /// Points added when recent water contamination exists.
    #[serde(default = "default_water_bonus")]
    pub water_bonus: u32,

    /// Upper clamp for the score.
    #[serde(default = "default_max_score")]
    pub max_score: u32,

    /// Score thresholds for each risk level.
    #[serde(default)]
    pub thresholds: LevelThresholds,

    /// Weight for any symptom missing from `symptom_weights`.
    #[serde(default = "default_symptom_weight")]
    pub default_symptom_weight: u32,

    /// Per-symptom severity weights, keyed by canonical symptom name.
    #[serde(default = "default_symptom_weights")]
    pub symptom_weights: BTreeMap<String, u32>,
}

impl RiskConfig {
    /// Check that thresholds are ordered and windows are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(t.medium <= t.high && t.high <= t.critical) {
            return Err(invalid(
                "risk.thresholds must satisfy medium <= high <= critical",
            ));
        }
        if self.cluster_window_hours == 0 || self.water_window_days == 0 {
            return Err(invalid("risk windows must be at least 1"));
        }
        if self.max_score == 0 {
            return Err(invalid("risk.max_score must be at least 1"));
        }
        Ok(())
    }

    /// Weight of a single symptom occurrence.
    pub fn symptom_weight(&self, symptom: &str) -> u32 {
        self.symptom_weights
            .get(symptom)
            .copied()
            .unwrap_or(self.default_symptom_weight)
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            cluster_window_hours: default_cluster_window_hours(),
            cluster_min_cases: default_cluster_min_cases(),
            cluster_symptom_threshold: default_cluster_symptom_threshold(),
            water_window_days: default_water_window_days(),
            case_weight: default_case_weight(),
            cluster_bonus: default_cluster_bonus(),
            water_bonus: default_water_bonus(),
            max_score: default_max_score(),
            thresholds: LevelThresholds::default(),
            default_symptom_weight: default_symptom_weight(),
            symptom_weights: default_symptom_weights(),
        }
    }
}

/// Minimum score for each non-`Low` risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LevelThresholds {
    /// Scores at or above this are `Critical`.
    #[serde(default = "default_critical_threshold")]
    pub critical: u32,

    /// Scores at or above this are at least `High`.
    #[serde(default = "default_high_threshold")]
    pub high: u32,

    /// Scores at or above this are at least `Medium`.
    #[serde(default = "default_medium_threshold")]
    pub medium: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            critical: default_critical_threshold(),
            high: default_high_threshold(),
            medium: default_medium_threshold(),
        }
    }
}

/// Which key-value backend holds the event collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store; contents are lost on exit.
    #[default]
    Memory,
    /// `Dragonfly` / Redis at `storage.dragonfly_url`.
    Dragonfly,
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StorageBackend,

    /// `Dragonfly` connection URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Prefix for the persisted keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Load the demo seed dataset when nothing is persisted yet.
    #[serde(default = "default_true")]
    pub seed_on_empty: bool,
}

impl StorageConfig {
    /// Override the `Dragonfly` URL with `DRAGONFLY_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = val;
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dragonfly_url: default_dragonfly_url(),
            key_prefix: default_key_prefix(),
            seed_on_empty: true,
        }
    }
}

/// Outbreak demo harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutbreakConfig {
    /// Village the synthetic outbreak hits.
    #[serde(default = "default_outbreak_village")]
    pub village: String,

    /// Number of synthetic cases inserted.
    #[serde(default = "default_outbreak_case_count")]
    pub case_count: u32,

    /// Delay between consecutive steps, in milliseconds.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Seed for the symptom-mix generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Run the outbreak once when the engine binary starts.
    #[serde(default)]
    pub run_on_startup: bool,
}

impl Default for OutbreakConfig {
    fn default() -> Self {
        Self {
            village: default_outbreak_village(),
            case_count: default_outbreak_case_count(),
            step_interval_ms: default_step_interval_ms(),
            seed: default_seed(),
            run_on_startup: false,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_district_name() -> String {
    "Majuli District".to_owned()
}

fn default_villages() -> Vec<String> {
    vec![
        "Majuli".to_owned(),
        "Kamalabari".to_owned(),
        "Garamur".to_owned(),
        "Jengraimukh".to_owned(),
        "Auniati".to_owned(),
    ]
}

const fn default_cluster_window_hours() -> u32 {
    48
}

const fn default_cluster_min_cases() -> u32 {
    5
}

const fn default_cluster_symptom_threshold() -> u32 {
    5
}

const fn default_water_window_days() -> u32 {
    7
}

const fn default_case_weight() -> u32 {
    2
}

const fn default_cluster_bonus() -> u32 {
    40
}

const fn default_water_bonus() -> u32 {
    30
}

const fn default_max_score() -> u32 {
    100
}

const fn default_critical_threshold() -> u32 {
    80
}

const fn default_high_threshold() -> u32 {
    50
}

const fn default_medium_threshold() -> u32 {
    25
}

const fn default_symptom_weight() -> u32 {
    1
}

fn default_symptom_weights() -> BTreeMap<String, u32> {
    let mut m = BTreeMap::new();
    m.insert("Diarrhea".to_owned(), 5);
    m.insert("Vomiting".to_owned(), 4);
    m.insert("Fever".to_owned(), 3);
    m.insert("Dehydration".to_owned(), 8);
    m.insert("Stomach Pain".to_owned(), 2);
    m.insert("Skin Rash".to_owned(), 3);
    m.insert("Breathing Difficulty".to_owned(), 7);
    m
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_key_prefix() -> String {
    "arogya".to_owned()
}

fn default_outbreak_village() -> String {
    "Majuli".to_owned()
}

const fn default_outbreak_case_count() -> u32 {
    8
}

const fn default_step_interval_ms() -> u64 {
    800
}

const fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SurveillanceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.risk.cluster_window_hours, 48);
        assert_eq!(config.risk.water_window_days, 7);
        assert_eq!(config.risk.thresholds.critical, 80);
        assert_eq!(config.outbreak.case_count, 8);
        assert!(config.district.villages.iter().any(|v| v == "Majuli"));
    }

    #[test]
    fn default_symptom_table() {
        let risk = RiskConfig::default();
        assert_eq!(risk.symptom_weight("Diarrhea"), 5);
        assert_eq!(risk.symptom_weight("Vomiting"), 4);
        assert_eq!(risk.symptom_weight("Fever"), 3);
        assert_eq!(risk.symptom_weight("Dehydration"), 8);
        assert_eq!(risk.symptom_weight("Stomach Pain"), 2);
        assert_eq!(risk.symptom_weight("Skin Rash"), 3);
        assert_eq!(risk.symptom_weight("Breathing Difficulty"), 7);
        assert_eq!(risk.symptom_weight("Hiccups"), 1);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
district:
  name: "Test District"
  villages:
    - Alpha
    - Beta

risk:
  cluster_window_hours: 24
  cluster_min_cases: 3
  cluster_symptom_threshold: 3
  water_window_days: 3
  case_weight: 1
  cluster_bonus: 20
  water_bonus: 10
  max_score: 100
  thresholds:
    critical: 90
    high: 60
    medium: 30
  default_symptom_weight: 2
  symptom_weights:
    Cough: 4

storage:
  backend: dragonfly
  key_prefix: "test"
  seed_on_empty: false

outbreak:
  village: Beta
  case_count: 4
  step_interval_ms: 10
  seed: 7
  run_on_startup: true

logging:
  level: "debug"
  format: json
"#;

        let config = SurveillanceConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.district.villages, vec!["Alpha", "Beta"]);
        assert_eq!(config.risk.cluster_window_hours, 24);
        assert_eq!(config.risk.thresholds.high, 60);
        assert_eq!(config.risk.symptom_weight("Cough"), 4);
        assert_eq!(config.risk.symptom_weight("Fever"), 2);
        assert_eq!(config.storage.backend, StorageBackend::Dragonfly);
        assert!(!config.storage.seed_on_empty);
        assert_eq!(config.outbreak.village, "Beta");
        assert!(config.outbreak.run_on_startup);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "outbreak:\n  case_count: 12\n";
        let config = SurveillanceConfig::parse(yaml).ok().unwrap_or_default();

        assert_eq!(config.outbreak.case_count, 12);
        // Everything else uses defaults
        assert_eq!(config.risk.cluster_bonus, 40);
        assert_eq!(config.district.villages.len(), 5);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SurveillanceConfig::parse("").is_ok());
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let yaml = "risk:\n  thresholds:\n    critical: 40\n    high: 50\n    medium: 25\n";
        let result = SurveillanceConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn empty_village_list_is_rejected() {
        let yaml = "district:\n  villages: []\n";
        let result = SurveillanceConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn outbreak_village_outside_district_is_rejected() {
        let yaml = "outbreak:\n  village: Nowhere\n";
        let result = SurveillanceConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let yaml = "district:\n  villages: [Alpha, Beta]\noutbreak:\n  village: Beta\n";
        assert!(SurveillanceConfig::parse(yaml).is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("arogya-config.yaml");
        if path.exists() {
            let config = SurveillanceConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
