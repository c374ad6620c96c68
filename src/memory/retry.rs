//! Caller-driven retries of failed scatter requests

use super::batch::ScatterBatch;
use super::engine::ScatterReader;
use super::report::ScatterReport;
use crate::config::RetryConfig;
use crate::core::types::{ProcessId, ProviderResult};
use crate::provider::Session;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how patiently failed pages are re-requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub const fn none() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Delay before attempt `attempt + 1`, for `attempt >= 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.backoff_multiplier.max(1),
        }
    }
}

/// Reads `batch`, then re-submits only its failed requests until all are
/// read or `policy.max_attempts` calls have been made
///
/// Pages read in an earlier attempt are kept as they were. Fatal errors end
/// the loop immediately.
pub fn read_with_retry(
    session: &mut Session,
    pid: ProcessId,
    batch: ScatterBatch,
    policy: &RetryPolicy,
) -> ProviderResult<ScatterReport> {
    let flags = batch.flags();
    let mut report = ScatterReader::new(session).read(pid, batch)?;

    let mut attempt = 1;
    while !report.is_complete() && attempt < policy.max_attempts {
        let delay = policy.backoff(attempt);
        debug!(
            "Retrying {} failed pages in {} after {:?} (attempt {}/{})",
            report.failure_count(),
            pid,
            delay,
            attempt + 1,
            policy.max_attempts
        );
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let retry = report.retry_batch(flags)?;
        let retried = ScatterReader::new(session).read(pid, retry)?;
        report.merge(retried);
        attempt += 1;
    }

    if !report.is_complete() && policy.max_attempts > 1 {
        warn!(
            "{} pages in {} still unreadable after {} attempts",
            report.failure_count(),
            pid,
            attempt
        );
    }
    Ok(report)
}
