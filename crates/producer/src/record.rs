use std::{
    process,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use spool_protocol::Record;

static KEY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Partition key of the form `<unix-nanos>-<pid>-<seq>`.
///
/// The sequence is process-wide and monotonic, so keys never repeat within a
/// process; the pid and wall clock separate concurrent processes.
pub fn next_partition_key() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = KEY_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    format!("{nanos}-{}-{seq}", process::id())
}

/// Records accumulated during one buffering window.
#[derive(Debug, Default)]
pub struct Batch {
    records: Vec<Record>,
    estimated_size: usize,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.estimated_size += record.estimated_size();
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Whether `record` must start the next batch instead of joining this one.
    ///
    /// An empty batch always admits, so a record larger than `max_bytes` still
    /// goes out on its own.
    pub fn would_overflow(&self, record: &Record, max_bytes: usize, max_records: usize) -> bool {
        !self.is_empty()
            && (self.estimated_size + record.estimated_size() >= max_bytes
                || self.len() >= max_records)
    }

    /// No further record can join this batch.
    pub fn is_full(&self, max_bytes: usize, max_records: usize) -> bool {
        self.estimated_size >= max_bytes || self.len() >= max_records
    }

    pub fn take(&mut self) -> Vec<Record> {
        self.estimated_size = 0;
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
