//! Core module containing fundamental types for vmm-client
//!
//! This module provides the foundational building blocks used throughout
//! the client: target addresses, process identifiers, module descriptors
//! and the error taxonomy.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, ModuleDescriptor, ProcessId, ProviderError, ProviderResult, PAGE_SIZE,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[cfg(not(target_pointer_width = "64"))]
compile_error!("vmm-client requires a 64-bit architecture");
