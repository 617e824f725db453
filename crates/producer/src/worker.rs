use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use anyhow::anyhow;
use log::{debug, error, info, warn};
use spool_protocol::Record;

use crate::{
    client::PutRecords,
    config::ProducerConfig,
    queue::{Dequeued, RecordQueue},
    record::{Batch, next_partition_key},
    stats::ProducerStats,
};

/// Background batching loop.
///
/// Cycles between buffering (draining the queue for at most one window) and
/// flushing (one blocking `put_records` call). Once `stop` is raised it keeps
/// cycling until the queue looks empty, then performs a final flush that also
/// covers any carry-over record.
pub(crate) struct Worker {
    config: ProducerConfig,
    queue: RecordQueue,
    client: Box<dyn PutRecords>,
    stop: Arc<AtomicBool>,
    stats: Arc<ProducerStats>,
    batch: Batch,
    /// Record that overflowed the previous batch; seeds the next one.
    carry_over: Option<Record>,
}

impl Worker {
    pub(crate) fn new(
        config: ProducerConfig,
        queue: RecordQueue,
        client: Box<dyn PutRecords>,
        stop: Arc<AtomicBool>,
        stats: Arc<ProducerStats>,
    ) -> Self {
        Self {
            config,
            queue,
            client,
            stop,
            stats,
            batch: Batch::new(),
            carry_over: None,
        }
    }

    fn is_alive(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }

    pub(crate) fn run(mut self) {
        info!("worker started for stream {}", self.config.stream_name);

        let mut logged_stop = false;
        while self.is_alive() || !self.queue.is_empty() {
            if !logged_stop && !self.is_alive() {
                info!(
                    "shutdown observed; draining {} queued records",
                    self.queue.len()
                );
                logged_stop = true;
            }

            self.buffer();
            self.flush();
        }

        self.finish();
        info!("worker for stream {} stopped", self.config.stream_name);
    }

    /// Fill the current batch for up to one buffer window.
    ///
    /// Returns early when a record overflows the batch, when the batch is full,
    /// or when a poll comes back empty after shutdown was requested.
    fn buffer(&mut self) {
        let window_start = Instant::now();

        if let Some(record) = self.carry_over.take() {
            self.batch.push(record);
        }
        if self.batch_is_full() {
            return;
        }

        loop {
            let Some(remaining) = self
                .config
                .buffer_time
                .checked_sub(window_start.elapsed())
                .filter(|r| !r.is_zero())
            else {
                break;
            };

            // While stopping, drain without waiting so shutdown stays prompt.
            let polled = if self.is_alive() {
                self.queue.dequeue(remaining.min(self.config.poll_interval))
            } else {
                self.queue.try_dequeue()
            };

            match polled {
                Dequeued::Payload(data) => {
                    if !self.admit(data) {
                        break;
                    }
                }
                Dequeued::Empty => {
                    if !self.is_alive() {
                        break;
                    }
                }
                Dequeued::Closed => {
                    debug!("record queue closed; stopping");
                    self.stop.store(true, Ordering::Release);
                    break;
                }
            }
        }
    }

    /// Add a freshly dequeued payload. Returns false when buffering must stop
    /// for this window.
    fn admit(&mut self, data: Vec<u8>) -> bool {
        let record = Record::new(data, next_partition_key());

        if self.batch.would_overflow(
            &record,
            self.config.max_batch_size,
            self.config.max_batch_records,
        ) {
            self.carry_over = Some(record);
            return false;
        }

        self.batch.push(record);
        !self.batch_is_full()
    }

    fn batch_is_full(&self) -> bool {
        self.batch
            .is_full(self.config.max_batch_size, self.config.max_batch_records)
    }

    /// Submit the current batch, if any. Failures are reported, never retried.
    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        let estimated_size = self.batch.estimated_size();
        let records = self.batch.take();
        let count = records.len();
        let stream_name = &self.config.stream_name;
        let client = &self.client;
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            client.put_records(stream_name, &records)
        }))
        .unwrap_or_else(|payload| {
            Err(anyhow!(
                "put_records panicked: {}",
                panic_message(&*payload)
            ))
        });

        match outcome {
            Ok(response) => {
                self.stats.record_flush(count, response.failed_record_count);
                if response.failed_record_count > 0 {
                    warn!(
                        "stream {stream_name} rejected {} of {count} records",
                        response.failed_record_count
                    );
                }
                debug!(
                    "flushed {count} records (~{estimated_size} bytes) to {stream_name} in {:?}",
                    started.elapsed()
                );
            }
            Err(e) => {
                self.stats.record_failure(count);
                error!("failed to put {count} records to stream {stream_name}: {e:#}");
            }
        }
    }

    /// Last flush before exit. The carry-over goes out as its own batch.
    fn finish(&mut self) {
        self.flush();
        if let Some(record) = self.carry_over.take() {
            self.batch.push(record);
            self.flush();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
