//! Repeated scatter reads of a module image
//!
//! Opens a session, resolves the configured process and module, then reads
//! the first pages of the module image once per iteration. Stopping is
//! cooperative: the flag is checked before each batch is submitted, since a
//! submitted batch cannot be interrupted.

use crate::config::{validate_config, Config};
use crate::core::types::{ProviderError, ProviderResult, PAGE_SIZE};
use crate::memory::{read_with_retry, ReadFlags, RetryPolicy, ScatterBatch};
use crate::provider::{ProviderLoader, Session};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Bytes of the first page shown in the summary
const PREVIEW_LEN: usize = 16;

/// Outcome of a workload run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    pub process: String,
    pub pid: u32,
    pub module: String,
    pub base_address: String,
    pub image_size: u32,
    pub iterations_requested: u64,
    pub iterations_completed: u64,
    pub pages_read: u64,
    pub pages_failed: u64,
    pub cancelled: bool,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Runs the configured read loop
///
/// The configuration is validated before the provider is loaded. The
/// session is closed on every return path, including errors.
pub fn run<L>(loader: &L, config: &Config, stop: &AtomicBool) -> ProviderResult<ReadSummary>
where
    L: ProviderLoader + ?Sized,
{
    validate_config(config)?;
    let started = Instant::now();
    let target = &config.target;
    let mut session = Session::open_with(loader, &config.provider)?;

    let pid = session
        .resolve_process(&target.process)?
        .ok_or_else(|| ProviderError::TargetNotFound(format!("process {}", target.process)))?;
    let module = session.resolve_module(pid, &target.module)?.ok_or_else(|| {
        ProviderError::TargetNotFound(format!("module {} in process {}", target.module, pid))
    })?;

    let flags = ReadFlags::from_config(&config.scatter);
    let policy = RetryPolicy::from(&config.retry);
    let region_len = u64::from(config.scatter.pages_per_read) * PAGE_SIZE;

    let mut summary = ReadSummary {
        process: target.process.clone(),
        pid: pid.raw(),
        module: target.module.clone(),
        base_address: module.base_address.to_string(),
        image_size: module.image_size,
        iterations_requested: target.iterations,
        iterations_completed: 0,
        pages_read: 0,
        pages_failed: 0,
        cancelled: false,
        elapsed_ms: 0,
        preview: None,
    };

    for iteration in 0..target.iterations {
        if stop.load(Ordering::SeqCst) {
            info!("Stopping after {} iterations", iteration);
            summary.cancelled = true;
            break;
        }

        let batch = ScatterBatch::for_region(module.base_address, region_len, flags)?;
        let report = read_with_retry(&mut session, pid, batch, &policy)?;
        debug!(
            "Iteration {}: {} read, {} failed",
            iteration,
            report.success_count(),
            report.failure_count()
        );

        summary.pages_read += report.success_count() as u64;
        summary.pages_failed += report.failure_count() as u64;
        if summary.preview.is_none() {
            summary.preview = report
                .get(module.base_address)
                .map(|page| hex::encode(&page[..PREVIEW_LEN.min(page.len())]));
        }
        summary.iterations_completed += 1;
    }

    session.close();
    summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        "Read {} pages ({} failed) from {} in {} over {} iterations",
        summary.pages_read,
        summary.pages_failed,
        summary.module,
        summary.process,
        summary.iterations_completed
    );
    Ok(summary)
}
