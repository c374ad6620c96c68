//! Configuration validator for vmm-client
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{
    Config, ConfigError, LoggingConfig, ProviderConfig, RetryConfig, ScatterConfig, TargetConfig,
};

/// Upper bound on pages in one workload batch
pub const MAX_PAGES_PER_READ: u32 = 4096;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_provider(&config.provider)?;
        Self::validate_scatter(&config.scatter)?;
        Self::validate_retry(&config.retry)?;
        Self::validate_target(&config.target)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates provider configuration
    fn validate_provider(provider: &ProviderConfig) -> Result<(), ConfigError> {
        if provider.library_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Provider library path cannot be empty".to_string(),
            ));
        }

        if provider.device.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Provider device cannot be empty".to_string(),
            ));
        }

        if provider.verbosity > 3 {
            return Err(ConfigError::Invalid(
                "Provider verbosity cannot exceed 3".to_string(),
            ));
        }

        // Arguments cross the ABI as C strings
        if provider.to_args().iter().any(|arg| arg.contains('\0')) {
            return Err(ConfigError::Invalid(
                "Provider arguments cannot contain NUL bytes".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates scatter configuration
    fn validate_scatter(scatter: &ScatterConfig) -> Result<(), ConfigError> {
        if scatter.pages_per_read == 0 {
            return Err(ConfigError::Invalid(
                "Pages per read must be at least 1".to_string(),
            ));
        }

        if scatter.pages_per_read > MAX_PAGES_PER_READ {
            return Err(ConfigError::Invalid(format!(
                "Pages per read cannot exceed {}",
                MAX_PAGES_PER_READ
            )));
        }

        Ok(())
    }

    /// Validates retry configuration
    fn validate_retry(retry: &RetryConfig) -> Result<(), ConfigError> {
        if retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "Retry attempts must be at least 1".to_string(),
            ));
        }

        if retry.backoff_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "Backoff multiplier must be at least 1".to_string(),
            ));
        }

        if retry.initial_backoff_ms > retry.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "Initial backoff cannot exceed maximum backoff".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates target configuration
    fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
        if target.process.trim().is_empty() || target.module.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Target process and module names cannot be empty".to_string(),
            ));
        }

        if target.iterations == 0 {
            return Err(ConfigError::Invalid(
                "Iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
