//! Client-side buffering producer for an append-only stream.
//!
//! Callers hand payloads to a [`Producer`]; a single background worker drains
//! them for a bounded time window, packs them into size-bounded batches and
//! submits each batch through a [`PutRecords`] implementation.

mod client;
mod config;
mod producer;
mod queue;
mod record;
mod stats;
mod worker;

#[cfg(test)]
mod test_support;

pub use client::PutRecords;
pub use config::{
    DEFAULT_BUFFER_TIME, DEFAULT_MAX_BATCH_RECORDS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_POLL_INTERVAL,
    ProducerConfig,
};
pub use producer::Producer;
pub use queue::{Dequeued, QueueHandle, RecordQueue, channel};
pub use record::{Batch, next_partition_key};
pub use spool_protocol::{PutRecordsResponse, Record};
pub use stats::{ProducerStats, StatsSnapshot};
