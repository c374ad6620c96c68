//! vmm-client: client for DMA memory-introspection providers
//!
//! Binds a provider library's exports, initializes it inside a [`Session`],
//! resolves processes and modules, and reads target memory with batched
//! scatter reads.

pub mod config;
pub mod core;
pub mod memory;
pub mod process;
pub mod provider;
pub mod windows;
pub mod workload;

// Re-export main types from core module
pub use crate::core::types::{
    Address, ModuleDescriptor, ProcessId, ProviderError, ProviderResult, PAGE_SIZE,
};

pub use memory::{
    read_with_retry, ReadFlags, ReadOutcome, RetryPolicy, ScatterBatch, ScatterReport,
};
pub use provider::{Session, SessionState, SharedSession};
