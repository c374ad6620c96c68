//! Configuration loader for vmm-client
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "VMM_CLIENT_CONFIG";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub scatter: ScatterConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Provider library and startup arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "defaults::library_path")]
    pub library_path: String,
    #[serde(default = "defaults::device")]
    pub device: String,
    #[serde(default = "defaults::wait_initialize")]
    pub wait_initialize: bool,
    #[serde(default)]
    pub printf: bool,
    #[serde(default)]
    pub verbosity: u8,
    #[serde(default)]
    pub no_refresh: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memmap: Option<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Scatter read configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    #[serde(default = "defaults::no_cache")]
    pub no_cache: bool,
    #[serde(default)]
    pub zero_pad_on_fail: bool,
    #[serde(default = "defaults::pages_per_read")]
    pub pages_per_read: u32,
}

/// Caller-driven retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "defaults::initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "defaults::max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "defaults::backoff_multiplier")]
    pub backoff_multiplier: u32,
}

/// Process and module read by the workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "defaults::target_process")]
    pub process: String,
    #[serde(default = "defaults::target_module")]
    pub module: String,
    #[serde(default = "defaults::iterations")]
    pub iterations: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl ProviderConfig {
    /// Renders the Initialize argument vector
    ///
    /// `argv[0]` is the empty program name the provider expects.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![String::new()];
        if self.wait_initialize {
            args.push("-waitinitialize".to_string());
        }
        if self.printf {
            args.push("-printf".to_string());
        }
        match self.verbosity {
            0 => {}
            1 => args.push("-v".to_string()),
            2 => args.push("-vv".to_string()),
            _ => args.push("-vvv".to_string()),
        }
        if self.no_refresh {
            args.push("-norefresh".to_string());
        }
        if let Some(memmap) = &self.memmap {
            args.push("-memmap".to_string());
            args.push(memmap.clone());
        }
        args.push("-device".to_string());
        args.push(self.device.clone());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            library_path: defaults::library_path(),
            device: defaults::device(),
            wait_initialize: defaults::WAIT_INITIALIZE,
            printf: defaults::PRINTF,
            verbosity: defaults::VERBOSITY,
            no_refresh: defaults::NO_REFRESH,
            memmap: None,
            extra_args: Vec::new(),
        }
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        ScatterConfig {
            no_cache: defaults::NO_CACHE,
            zero_pad_on_fail: defaults::ZERO_PAD_ON_FAIL,
            pages_per_read: defaults::PAGES_PER_READ,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: defaults::MAX_ATTEMPTS,
            initial_backoff_ms: defaults::INITIAL_BACKOFF_MS,
            max_backoff_ms: defaults::MAX_BACKOFF_MS,
            backoff_multiplier: defaults::BACKOFF_MULTIPLIER,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            process: defaults::target_process(),
            module: defaults::target_module(),
            iterations: defaults::ITERATIONS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: defaults::log_level(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, falling back to defaults only if the file is missing
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from `VMM_CLIENT_CONFIG` or `config.toml`
pub fn load_config() -> Result<Config, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    ConfigLoader::new(path).load_or_default()
}
