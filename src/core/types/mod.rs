//! Core type definitions for vmm-client
//!
//! Addresses, process and module descriptors, and the error type shared by
//! every layer of the client.

mod address;
mod error;
mod target;

// Re-export all public types
pub use address::{Address, PAGE_SIZE};
pub use error::{ProviderError, ProviderResult};
pub use target::{ModuleDescriptor, ProcessId};
