//! TOML configuration for the eventsweep daemon.
//!
//! Layered configuration model with compiled-in defaults, environment
//! variable override for the config file path, and a standard filesystem
//! location.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the eventsweep process.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cleanup: CleanupSettings,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path specified by the `EVENTSWEEP_CONFIG` environment variable.
    /// 2. `/etc/eventsweep/eventsweep.toml`.
    /// 3. Fall back to compiled-in defaults.
    pub fn load_or_default() -> Self {
        // 1. Environment variable override.
        if let Ok(env_path) = std::env::var("EVENTSWEEP_CONFIG") {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "EVENTSWEEP_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        // 2. Standard system location.
        let system_path = Path::new("/etc/eventsweep/eventsweep.toml");
        if system_path.exists() {
            match Self::load(system_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %system_path.display(),
                        error = %e,
                        "system config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        // 3. Defaults.
        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP API listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address and port for the API listener.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/eventsweep.db".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Cadence and trigger settings for the expired-event cleanup job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Local wall-clock hour at which the daily run fires.
    pub run_hour: u32,
    /// Local wall-clock minute at which the daily run fires.
    pub run_minute: u32,
    /// Cadence label recorded on the scheduled-task row.
    pub frequency: String,
    /// Delay between process start and the unconditional boot run (seconds).
    pub boot_delay_secs: u64,
    /// Wall-clock polling interval of the scheduler loop (seconds).
    pub poll_interval_secs: u64,
}

impl CleanupSettings {
    /// The run time as recorded on the scheduled-task row, e.g. `02:00`.
    pub fn run_time(&self) -> String {
        format!("{:02}:{:02}", self.run_hour, self.run_minute)
    }
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            run_hour: 2,
            run_minute: 0,
            frequency: "daily".to_string(),
            boot_delay_secs: 10,
            poll_interval_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
