//! Error types for the surveillance engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and outbreak
//! execution so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: arogya_core::config::ConfigError,
    },

    /// Connecting to the configured store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: arogya_store::StoreError,
    },

    /// A controller command failed.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: arogya_core::controller::ControllerError,
    },
}
