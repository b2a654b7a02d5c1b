//! Configuration loading and typed config structures for Tidewatch.
//!
//! The configuration lives in `tidewatch.yaml`. Every field has a
//! default, so an empty or missing file yields a working setup: the
//! API enabled on port 63030, sampling once per second.

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

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TidewatchConfig {
    /// HTTP API settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Sampling cadence.
    #[serde(default)]
    pub collector: CollectorSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TidewatchConfig {
    /// Load configuration from a YAML file and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Override values from the environment when set:
    ///
    /// - `TIDEWATCH_PORT` overrides `server.port`
    /// - `TIDEWATCH_ENABLED` overrides `server.enabled`
    /// - `TIDEWATCH_REFRESH_INTERVAL` overrides `collector.refresh_interval_secs`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a set variable cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("TIDEWATCH_PORT") {
            self.server.port = parse_override("TIDEWATCH_PORT", &val)?;
        }
        if let Some(val) = lookup("TIDEWATCH_ENABLED") {
            self.server.enabled = parse_override("TIDEWATCH_ENABLED", &val)?;
        }
        if let Some(val) = lookup("TIDEWATCH_REFRESH_INTERVAL") {
            self.collector.refresh_interval_secs =
                parse_override("TIDEWATCH_REFRESH_INTERVAL", &val)?;
        }
        Ok(())
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                reason: "server.port must be a positive port number".to_owned(),
            });
        }
        let interval = self.collector.refresh_interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("collector.refresh_interval_secs must be > 0, got {interval}"),
            });
        }
        if self.collector.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "collector.frame_interval_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, val: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e| ConfigError::Invalid {
        reason: format!("{key}={val:?}: {e}"),
    })
}

/// HTTP API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Whether the Query Service is started at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Sampling cadence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectorSection {
    /// Minimum seconds between sampling cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: f64,

    /// How often the driver calls `tick`, in milliseconds. Should be
    /// well below the refresh interval.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    63030
}

const fn default_refresh_interval_secs() -> f64 {
    1.0
}

const fn default_frame_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
