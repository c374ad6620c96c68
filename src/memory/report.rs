//! Results of scatter reads

use super::batch::{ReadOutcome, ScatterBatch, ScatterRequest};
use super::flags::ReadFlags;
use crate::core::types::{Address, ProviderResult};
use std::collections::{BTreeMap, BTreeSet};

/// Per-request outcome of one or more scatter reads
///
/// Every submitted request appears exactly once, either with its bytes or
/// as a failed address. Unreadable pages are data here, never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatterReport {
    reads: BTreeMap<Address, Vec<u8>>,
    failed: BTreeMap<Address, usize>,
    attempts: u32,
}

impl ScatterReport {
    /// Collects the outcomes of submitted requests
    ///
    /// An empty batch never reaches the provider and counts no attempt.
    pub(crate) fn from_requests(requests: Vec<ScatterRequest>) -> Self {
        let mut report = ScatterReport {
            attempts: u32::from(!requests.is_empty()),
            ..Self::default()
        };
        for request in requests {
            let address = request.address();
            match request.outcome() {
                ReadOutcome::Success => {
                    report.reads.insert(address, request.into_buffer());
                }
                ReadOutcome::Failure | ReadOutcome::Pending => {
                    report.failed.insert(address, request.size());
                }
            }
        }
        report
    }

    /// Number of requests with an outcome
    pub fn len(&self) -> usize {
        self.reads.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn success_count(&self) -> usize {
        self.reads.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every request was read
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Provider calls that contributed to this report
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Bytes read at `address`, if that request succeeded
    pub fn get(&self, address: Address) -> Option<&[u8]> {
        self.reads.get(&address).map(Vec::as_slice)
    }

    /// Outcome of the request at `address`, if it was part of the batch
    pub fn outcome(&self, address: Address) -> Option<ReadOutcome> {
        if self.reads.contains_key(&address) {
            Some(ReadOutcome::Success)
        } else if self.failed.contains_key(&address) {
            Some(ReadOutcome::Failure)
        } else {
            None
        }
    }

    /// Successful reads keyed by address
    pub fn successes(&self) -> &BTreeMap<Address, Vec<u8>> {
        &self.reads
    }

    /// Addresses whose pages could not be read
    pub fn failed_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.failed.keys().copied()
    }

    /// A fresh batch holding only the failed requests
    pub fn retry_batch(&self, flags: ReadFlags) -> ProviderResult<ScatterBatch> {
        let mut batch = ScatterBatch::new(flags);
        for (&address, &size) in &self.failed {
            batch.add(address, size)?;
        }
        Ok(batch)
    }

    /// Folds the report of a retry into this one
    ///
    /// Pages that succeed in `retry` move from failed to read. Pages already
    /// read here are never replaced.
    pub fn merge(&mut self, retry: ScatterReport) {
        for (address, bytes) in retry.reads {
            if self.reads.contains_key(&address) {
                continue;
            }
            self.failed.remove(&address);
            self.reads.insert(address, bytes);
        }
        for (address, size) in retry.failed {
            if !self.reads.contains_key(&address) {
                self.failed.insert(address, size);
            }
        }
        self.attempts += retry.attempts;
    }

    /// Splits into successful reads and failed addresses
    pub fn into_parts(self) -> (BTreeMap<Address, Vec<u8>>, BTreeSet<Address>) {
        (self.reads, self.failed.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(address: u64, outcome: ReadOutcome, fill: u8) -> ScatterRequest {
        let mut request = ScatterRequest::page(Address::new(address)).unwrap();
        request.buffer_mut().fill(fill);
        request.set_outcome(outcome);
        request
    }

    #[test]
    fn test_from_requests() {
        let report = ScatterReport::from_requests(vec![
            request(0x1000, ReadOutcome::Success, 0xAA),
            request(0x2000, ReadOutcome::Failure, 0),
            request(0x3000, ReadOutcome::Success, 0xBB),
        ]);

        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.attempts(), 1);
        assert_eq!(report.get(Address::new(0x1000)).unwrap()[0], 0xAA);
        assert_eq!(report.get(Address::new(0x2000)), None);
        assert_eq!(report.outcome(Address::new(0x2000)), Some(ReadOutcome::Failure));
        assert_eq!(report.outcome(Address::new(0x9000)), None);
        assert_eq!(
            report.failed_addresses().collect::<Vec<_>>(),
            vec![Address::new(0x2000)]
        );
    }

    #[test]
    fn test_empty_report_counts_no_attempt() {
        let report = ScatterReport::from_requests(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.attempts(), 0);
    }

    #[test]
    fn test_pending_counts_as_failure() {
        let report = ScatterReport::from_requests(vec![request(0x1000, ReadOutcome::Pending, 0)]);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_retry_batch() {
        let report = ScatterReport::from_requests(vec![
            request(0x1000, ReadOutcome::Success, 1),
            request(0x2000, ReadOutcome::Failure, 0),
        ]);
        let batch = report.retry_batch(ReadFlags::NOCACHE).unwrap();
        assert_eq!(batch.addresses().collect::<Vec<_>>(), vec![Address::new(0x2000)]);
        assert_eq!(batch.flags(), ReadFlags::NOCACHE);
    }

    #[test]
    fn test_merge_never_overwrites_reads() {
        let mut report = ScatterReport::from_requests(vec![
            request(0x1000, ReadOutcome::Success, 0xAA),
            request(0x2000, ReadOutcome::Failure, 0),
        ]);
        let retry = ScatterReport::from_requests(vec![
            request(0x1000, ReadOutcome::Success, 0xCC),
            request(0x2000, ReadOutcome::Success, 0xBB),
        ]);

        report.merge(retry);
        assert!(report.is_complete());
        assert_eq!(report.attempts(), 2);
        assert_eq!(report.get(Address::new(0x1000)).unwrap()[0], 0xAA);
        assert_eq!(report.get(Address::new(0x2000)).unwrap()[0], 0xBB);

        // A later failure of an already-read page changes nothing
        let failed_again =
            ScatterReport::from_requests(vec![request(0x1000, ReadOutcome::Failure, 0)]);
        report.merge(failed_again);
        assert!(report.is_complete());
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_into_parts() {
        let report = ScatterReport::from_requests(vec![
            request(0x1000, ReadOutcome::Success, 7),
            request(0x2000, ReadOutcome::Failure, 0),
        ]);
        let (reads, failed) = report.into_parts();
        assert_eq!(reads.keys().copied().collect::<Vec<_>>(), vec![Address::new(0x1000)]);
        assert_eq!(failed.into_iter().collect::<Vec<_>>(), vec![Address::new(0x2000)]);
    }
}
