//! Windows API layer for loading the provider library
//!
//! The dynamic-loading bindings are compiled on Windows only. Error-code
//! formatting and UTF-16 conversion are portable so the rest of the crate,
//! and the in-process fake provider, can use them everywhere.

#[cfg(windows)]
pub mod bindings;
#[cfg(windows)]
pub mod types;
pub mod utils;

#[cfg(windows)]
pub use types::LibraryHandle;
pub use utils::{ErrorCode, WinError};
