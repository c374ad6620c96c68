//! Process and module resolution through the provider
//!
//! Lookups that find nothing are ordinary `None` results. Only failures of
//! the provider itself surface as errors.

pub mod resolver;

pub use resolver::ProcessResolver;
