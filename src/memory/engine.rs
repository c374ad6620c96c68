//! Submitting scatter batches to the provider

use super::batch::ScatterBatch;
use super::report::ScatterReport;
use crate::core::types::{ProcessId, ProviderResult};
use crate::provider::ffi;
use crate::provider::{EntryPoint, Session};
use tracing::{debug, trace};

/// Reads scatter batches from a process on a session
pub struct ScatterReader<'a> {
    session: &'a mut Session,
}

impl<'a> ScatterReader<'a> {
    /// Create a reader over a session
    pub fn new(session: &'a mut Session) -> Self {
        ScatterReader { session }
    }

    /// Submits every request of `batch` in a single provider call
    ///
    /// Unreadable pages come back as failed entries of the report and leave
    /// the session ready. Retrying them is up to the caller, see
    /// [`ScatterReport::retry_batch`] and [`read_with_retry`](super::read_with_retry).
    pub fn read(&mut self, pid: ProcessId, batch: ScatterBatch) -> ProviderResult<ScatterReport> {
        let flags = batch.flags();
        let mut requests = batch.into_requests();

        let filled = self.session.call(EntryPoint::ScatterRead, |table| {
            if requests.is_empty() {
                return Ok(0);
            }
            ffi::mem_read_scatter(table, pid.raw(), &mut requests, flags.bits())
        })?;

        let report = ScatterReport::from_requests(requests);
        debug!(
            "Scatter read in {}: {} requested, {} read, {} failed ({:?})",
            pid,
            report.len(),
            filled,
            report.failure_count(),
            flags
        );
        for address in report.failed_addresses() {
            trace!("Page {} unreadable in {}", address, pid);
        }
        Ok(report)
    }
}
