//! Windows error code handling utilities

use std::fmt;

/// Error codes reported while loading a provider library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    FileNotFound,
    PathNotFound,
    AccessDenied,
    InvalidHandle,
    ModuleNotFound,
    ProcedureNotFound,
    BadExeFormat,
    Unknown(u32),
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        match code {
            0 => ErrorCode::Success,
            2 => ErrorCode::FileNotFound,
            3 => ErrorCode::PathNotFound,
            5 => ErrorCode::AccessDenied,
            6 => ErrorCode::InvalidHandle,
            126 => ErrorCode::ModuleNotFound,
            127 => ErrorCode::ProcedureNotFound,
            193 => ErrorCode::BadExeFormat,
            _ => ErrorCode::Unknown(code),
        }
    }
}

impl ErrorCode {
    /// Get the last Windows error
    #[cfg(windows)]
    pub fn last_error() -> Self {
        unsafe { ErrorCode::from(winapi::um::errhandlingapi::GetLastError()) }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Success => write!(f, "Success"),
            ErrorCode::FileNotFound => write!(f, "File not found"),
            ErrorCode::PathNotFound => write!(f, "Path not found"),
            ErrorCode::AccessDenied => write!(f, "Access denied"),
            ErrorCode::InvalidHandle => write!(f, "Invalid handle"),
            ErrorCode::ModuleNotFound => write!(f, "Module or one of its dependencies not found"),
            ErrorCode::ProcedureNotFound => write!(f, "Procedure not found"),
            ErrorCode::BadExeFormat => write!(f, "Not a valid image for this architecture"),
            ErrorCode::Unknown(code) => write!(f, "Unknown error: {}", code),
        }
    }
}

/// Windows error wrapper
#[derive(Debug, Clone)]
pub struct WinError {
    code: ErrorCode,
    context: String,
}

impl WinError {
    /// Create a new Windows error from the last error code
    #[cfg(windows)]
    pub fn new(context: impl Into<String>) -> Self {
        WinError {
            code: ErrorCode::last_error(),
            context: context.into(),
        }
    }

    /// Create with specific error code
    pub fn with_code(code: ErrorCode, context: impl Into<String>) -> Self {
        WinError {
            code,
            context: context.into(),
        }
    }

    /// Error code carried by this error
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl fmt::Display for WinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.code)
    }
}
