//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `collector.toml`.
//!     loads configuration from file or falls back to defaults, then applies
//!     environment overrides.
//!
//! structure:
//!     - ServerConfig: Listening host and port.
//!     - StorageConfig: Where daily log files go, how they are named, and how
//!       many readings stay in memory.
//!     - LoggingConfig: Log level and whether to log each reading.
//!
//! environment overrides:
//!     - COLLECTOR_CONFIG:   path of the config file to load
//!     - COLLECTOR_DATA_DIR: storage.data_dir
//!     - COLLECTOR_HOST:     server.host
//!     - COLLECTOR_PORT:     server.port
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::window::DEFAULT_CAPACITY;

pub const CONFIG_PATH_VAR: &str = "COLLECTOR_CONFIG";
pub const DATA_DIR_VAR: &str = "COLLECTOR_DATA_DIR";
pub const HOST_VAR: &str = "COLLECTOR_HOST";
pub const PORT_VAR: &str = "COLLECTOR_PORT";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CollectorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_show_sensor_data")]
    pub show_sensor_data: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("plant_data")
}

fn default_file_prefix() -> String {
    "sensors_".to_string()
}

fn default_file_extension() -> String {
    "jsonl".to_string()
}

fn default_window_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_show_sensor_data() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_prefix: default_file_prefix(),
            file_extension: default_file_extension(),
            window_capacity: default_window_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), show_sensor_data: default_show_sensor_data() }
    }
}

impl LoggingConfig {
    /// Build the log filter from `level`
    /// a single bare word must name a level ("warn", "debug"); in directive
    /// lists such as "info,plant_collector=debug" every `=level` must parse
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        let level = self.level.trim();
        let directives: Vec<&str> = level.split(',').map(str::trim).filter(|d| !d.is_empty()).collect();
        let is_level = |s: &str| s.trim().parse::<LevelFilter>().is_ok();
        let valid = match directives.as_slice() {
            [single] if !single.contains('=') => is_level(*single),
            _ => directives
                .iter()
                .filter_map(|d| d.rsplit_once('='))
                .all(|(_, lvl)| is_level(lvl)),
        };
        if !valid {
            return Err(ConfigError::Invalid(format!("logging.level {:?} is not a log level", self.level)));
        }
        EnvFilter::try_new(level)
            .map_err(|e| ConfigError::Invalid(format!("logging.level {:?}: {}", self.level, e)))
    }
}

/// Where the active configuration came from
#[derive(Debug)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// a file existed but could not be loaded
    Fallback { path: PathBuf, error: ConfigError },
    Defaults,
}

impl CollectorConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load with default fallback
    /// nothing is logged here, the caller reports the origin once logging is up
    pub fn load_or_default() -> (Self, ConfigOrigin) {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("config").join("collector.toml"));
        paths.push(PathBuf::from("..").join("config").join("collector.toml"));

        for path in paths {
            if path.exists() {
                return match Self::load(&path) {
                    Ok(config) => (config, ConfigOrigin::File(path)),
                    Err(error) => (Self::default(), ConfigOrigin::Fallback { path, error }),
                };
            }
        }

        (Self::default(), ConfigOrigin::Defaults)
    }

    /// Apply COLLECTOR_* overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_VAR) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup(HOST_VAR) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_VAR) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env { var: PORT_VAR, value: port.clone() })?;
        }
        Ok(())
    }

    /// Reject settings the collector cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.window_capacity == 0 {
            return Err(ConfigError::Invalid("storage.window_capacity must be at least 1".into()));
        }
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage.data_dir must not be empty".into()));
        }
        let has_separator = |s: &str| s.contains('/') || s.contains('\\');
        if has_separator(&self.storage.file_prefix) {
            return Err(ConfigError::Invalid("storage.file_prefix must not contain a path separator".into()));
        }
        if has_separator(&self.storage.file_extension) {
            return Err(ConfigError::Invalid("storage.file_extension must not contain a path separator".into()));
        }
        Ok(())
    }

    /// host:port for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
