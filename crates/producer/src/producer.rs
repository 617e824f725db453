use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result, anyhow, bail};
use log::{error, info};
use signal_hook::{
    SigId,
    consts::{SIGINT, SIGTERM},
    flag,
};

use crate::{
    client::PutRecords,
    config::ProducerConfig,
    queue::{self, QueueHandle},
    stats::{ProducerStats, StatsSnapshot},
    worker::Worker,
};

/// Caller-facing handle: owns the record queue and the worker thread.
///
/// `submit` never waits for a flush. `shutdown` (also run on drop) stops the
/// worker cooperatively and blocks until every queued record has been
/// submitted.
pub struct Producer {
    stream_name: String,
    queue: QueueHandle,
    stop: Arc<AtomicBool>,
    stats: Arc<ProducerStats>,
    worker: Mutex<Option<JoinHandle<()>>>,
    signals: Mutex<Vec<SigId>>,
}

impl Producer {
    pub fn new<C>(config: ProducerConfig, client: C) -> Result<Self>
    where
        C: PutRecords + 'static,
    {
        config.validate()?;

        let (handle, queue) = queue::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(ProducerStats::default());
        let stream_name = config.stream_name.clone();

        info!(
            "starting producer for stream {stream_name}: buffer_time={:?}, max_batch_size={}, max_batch_records={}",
            config.buffer_time, config.max_batch_size, config.max_batch_records
        );

        let worker = Worker::new(
            config,
            queue,
            Box::new(client),
            Arc::clone(&stop),
            Arc::clone(&stats),
        );

        let join = thread::Builder::new()
            .name("spool-worker".into())
            .spawn(move || worker.run())
            .context("Failed to spawn producer worker thread")?;

        Ok(Self {
            stream_name,
            queue: handle,
            stop,
            stats,
            worker: Mutex::new(Some(join)),
            signals: Mutex::new(Vec::new()),
        })
    }

    /// Queue a payload for the next batch. Fails only after shutdown.
    pub fn submit(&self, payload: impl Into<Vec<u8>>) -> Result<()> {
        if self.stop.load(Ordering::Acquire) {
            bail!("producer for stream {} is shut down", self.stream_name);
        }

        self.queue.enqueue(payload.into()).with_context(|| {
            format!("producer for stream {} is shut down", self.stream_name)
        })?;
        self.stats.record_accepted();
        Ok(())
    }

    /// Treat SIGINT and SIGTERM as a shutdown request: stop buffering, drain,
    /// flush. Handlers are removed again by `shutdown`.
    pub fn register_signal_handlers(&self) -> Result<()> {
        let mut signals = self.signals.lock().unwrap_or_else(|e| e.into_inner());

        for sig in [SIGINT, SIGTERM] {
            let id = flag::register(sig, Arc::clone(&self.stop))
                .with_context(|| format!("Failed to register signal handler for {sig}"))?;
            signals.push(id);
        }

        Ok(())
    }

    /// Stop the worker and wait for it to drain. Safe to call repeatedly and
    /// from several threads; every call returns once the worker is gone.
    pub fn shutdown(&self) -> Result<()> {
        self.stop.store(true, Ordering::Release);

        let mut worker = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        let Some(join) = worker.take() else {
            return Ok(());
        };

        info!(
            "shutting down producer for stream {} ({} records pending)",
            self.stream_name,
            self.queue.len()
        );

        let joined = join.join();

        for id in self
            .signals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
        {
            signal_hook::low_level::unregister(id);
        }

        joined.map_err(|_| {
            anyhow!(
                "producer worker for stream {} panicked",
                self.stream_name
            )
        })?;

        let stats = self.stats.snapshot();
        info!(
            "producer for stream {} stopped: {} records submitted in {} batches, {} failed",
            self.stream_name, stats.records_submitted, stats.batches_flushed, stats.records_failed
        );
        Ok(())
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Advisory count of payloads not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// True once `shutdown` ran or a registered signal arrived.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(
                "producer for stream {} failed to shut down: {e:#}",
                self.stream_name
            );
        }
    }
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
