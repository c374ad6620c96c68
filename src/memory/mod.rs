//! Scatter read engine
//!
//! Reads many independent pages of a process in one provider call:
//! - [`ScatterBatch`] collects page-aligned requests and the batch flags
//! - [`ScatterReader`] submits a batch and records per-request outcomes
//! - [`ScatterReport`] maps read pages to their bytes and lists failures
//! - [`read_with_retry`] re-submits failed pages when the caller asks for it

pub mod batch;
pub mod engine;
pub mod flags;
pub mod report;
pub mod retry;

pub use batch::{ReadOutcome, ScatterBatch, ScatterRequest};
pub use engine::ScatterReader;
pub use flags::ReadFlags;
pub use report::ScatterReport;
pub use retry::{read_with_retry, RetryPolicy};
