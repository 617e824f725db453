use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Delivery counters shared between the facade and the worker.
#[derive(Debug, Default)]
pub struct ProducerStats {
    records_accepted: AtomicU64,
    records_submitted: AtomicU64,
    records_failed: AtomicU64,
    records_rejected: AtomicU64,
    batches_flushed: AtomicU64,
    batches_failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Payloads taken by `submit`
    pub records_accepted: u64,
    /// Records in batches the stream acknowledged
    pub records_submitted: u64,
    /// Records lost with a failed batch
    pub records_failed: u64,
    /// Records the stream rejected inside an acknowledged batch
    pub records_rejected: u64,
    pub batches_flushed: u64,
    pub batches_failed: u64,
}

impl ProducerStats {
    pub(crate) fn record_accepted(&self) {
        self.records_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, records: usize, rejected: u32) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.records_submitted
            .fetch_add(records as u64, Ordering::Relaxed);
        self.records_rejected
            .fetch_add(u64::from(rejected), Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, records: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.records_failed
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            records_submitted: self.records_submitted.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
        }
    }
}
