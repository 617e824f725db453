use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_BUFFER_TIME: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1 << 20;
/// Per-request record cap of the remote stream.
pub const DEFAULT_MAX_BATCH_RECORDS: usize = 500;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const BUFFER_TIME_ENV: &str = "SPOOL_BUFFER_TIME";
pub const MAX_BATCH_SIZE_ENV: &str = "SPOOL_MAX_BATCH_SIZE";
pub const MAX_BATCH_RECORDS_ENV: &str = "SPOOL_MAX_BATCH_RECORDS";

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerConfig {
    /// Target stream identifier
    pub stream_name: String,
    /// How long the worker accumulates before flushing
    pub buffer_time: Duration,
    /// Cumulative estimated bytes at which a batch is cut early
    pub max_batch_size: usize,
    pub max_batch_records: usize,
    /// Upper bound on a single queue poll
    pub poll_interval: Duration,
}

impl ProducerConfig {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            buffer_time: DEFAULT_BUFFER_TIME,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_batch_records: DEFAULT_MAX_BATCH_RECORDS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Defaults overridden by `SPOOL_BUFFER_TIME` (seconds),
    /// `SPOOL_MAX_BATCH_SIZE` and `SPOOL_MAX_BATCH_RECORDS`.
    pub fn from_env(stream_name: impl Into<String>) -> Result<Self> {
        let mut config = Self::new(stream_name);

        if let Some(secs) = env_override::<f64>(BUFFER_TIME_ENV)? {
            config = config.buffer_time_secs(secs)?;
        }
        if let Some(bytes) = env_override(MAX_BATCH_SIZE_ENV)? {
            config.max_batch_size = bytes;
        }
        if let Some(count) = env_override(MAX_BATCH_RECORDS_ENV)? {
            config.max_batch_records = count;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_buffer_time(mut self, buffer_time: Duration) -> Self {
        self.buffer_time = buffer_time;
        self
    }

    /// Set the buffering window from fractional seconds.
    pub fn buffer_time_secs(mut self, secs: f64) -> Result<Self> {
        self.buffer_time = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid buffer time {secs}s"))?;
        Ok(self)
    }

    pub fn with_max_batch_size(mut self, bytes: usize) -> Self {
        self.max_batch_size = bytes;
        self
    }

    pub fn with_max_batch_records(mut self, count: usize) -> Self {
        self.max_batch_records = count;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.stream_name.is_empty() {
            bail!("stream name cannot be empty");
        }
        if self.buffer_time.is_zero() {
            bail!("buffer time must be greater than zero");
        }
        if self.max_batch_size == 0 {
            bail!("max batch size must be greater than zero");
        }
        if self.max_batch_records == 0 {
            bail!("max batch records must be greater than zero");
        }
        if self.poll_interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }
        Ok(())
    }
}

fn env_override<T>(var: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value {raw:?} for {var}")),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
