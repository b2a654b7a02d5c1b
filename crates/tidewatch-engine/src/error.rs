//! Error types for the Tidewatch engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tidewatch_core::config::ConfigError,
    },

    /// The collector rejected its settings.
    #[error("collector error: {source}")]
    Collector {
        /// The underlying collector error.
        #[from]
        source: tidewatch_core::collector::CollectorError,
    },

    /// The Query Service failed to start or stop.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: tidewatch_api::ServerError,
    },
}
