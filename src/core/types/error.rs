//! Custom error types for vmm-client

use crate::config::ConfigError;
use std::fmt;
use thiserror::Error;

/// Main error type for provider operations
///
/// Recoverable outcomes are not errors: a process or module that cannot be
/// found is `None`, and an unreadable page is a failed entry in the
/// scatter report.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to load provider library {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Failed to resolve provider entry point: {symbol}")]
    Binding { symbol: String },

    #[error("Provider initialization failed with arguments {args:?}")]
    InitializationFailed { args: Vec<String> },

    #[error("Provider communication failure in {operation}: {signal}")]
    CommunicationFailure { operation: String, signal: String },

    #[error("Session is not ready (state: {state})")]
    SessionNotReady { state: String },

    #[error("Invalid scatter request: {0}")]
    InvalidRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Creates a load failure for a provider library path
    pub fn load_failed(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        ProviderError::LoadFailed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a communication failure for an entry point
    pub fn communication_failure(operation: impl fmt::Display, signal: impl Into<String>) -> Self {
        ProviderError::CommunicationFailure {
            operation: operation.to_string(),
            signal: signal.into(),
        }
    }

    /// Creates a session-not-ready error
    pub fn not_ready(state: impl fmt::Display) -> Self {
        ProviderError::SessionNotReady {
            state: state.to_string(),
        }
    }

    /// Creates an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        ProviderError::InvalidRequest(reason.into())
    }

    /// Whether this error ended the session it came from
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProviderError::LoadFailed { .. }
                | ProviderError::Binding { .. }
                | ProviderError::InitializationFailed { .. }
                | ProviderError::CommunicationFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Binding {
            symbol: "VMMDLL_MemReadScatter".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to resolve provider entry point: VMMDLL_MemReadScatter"
        );

        let err = ProviderError::communication_failure("VMMDLL_Initialize", "invalid handle");
        assert_eq!(
            err.to_string(),
            "Provider communication failure in VMMDLL_Initialize: invalid handle"
        );
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<(ProviderError, &str)> = vec![
            (
                ProviderError::load_failed("vmm.dll", "module not found"),
                "Failed to load provider library vmm.dll: module not found",
            ),
            (
                ProviderError::InitializationFailed {
                    args: vec!["".to_string(), "-device".to_string(), "fpga".to_string()],
                },
                "Provider initialization failed with arguments [\"\", \"-device\", \"fpga\"]",
            ),
            (
                ProviderError::not_ready("closed"),
                "Session is not ready (state: closed)",
            ),
            (
                ProviderError::invalid_request("address 0x1001 is not page aligned"),
                "Invalid scatter request: address 0x1001 is not page aligned",
            ),
            (
                ProviderError::InvalidArgument("name contains NUL".to_string()),
                "Invalid argument: name contains NUL",
            ),
            (
                ProviderError::TargetNotFound("process notepad.exe".to_string()),
                "Target not found: process notepad.exe",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ProviderError::Binding {
            symbol: "x".to_string()
        }
        .is_fatal());
        assert!(ProviderError::InitializationFailed { args: vec![] }.is_fatal());
        assert!(ProviderError::communication_failure("op", "sig").is_fatal());
        assert!(ProviderError::load_failed("p", "r").is_fatal());

        assert!(!ProviderError::not_ready("failed").is_fatal());
        assert!(!ProviderError::invalid_request("r").is_fatal());
        assert!(!ProviderError::TargetNotFound("t".to_string()).is_fatal());
    }

    #[test]
    fn test_from_implementations() {
        let cfg_err = ConfigError::Invalid("bad".to_string());
        let err: ProviderError = cfg_err.into();
        assert!(matches!(err, ProviderError::Config(_)));
    }
}
