use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use spool_protocol::Record;

/// One accepted record as persisted in a stream log.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoredRecord {
    /// Time the collector accepted the batch
    pub timestamp: DateTime<Utc>,
    pub partition_key: String,
    pub data: Vec<u8>,
}

impl From<StoredRecord> for Record {
    fn from(stored: StoredRecord) -> Self {
        Record::new(stored.data, stored.partition_key)
    }
}

/// Append-only JSONL log backing a single stream.
pub struct StreamStore {
    path: PathBuf,
}

impl StreamStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a whole batch with a single write. Returns the number of records written.
    pub fn append(&self, records: &[Record]) -> io::Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let timestamp = Utc::now();
        let mut buf = Vec::new();
        for record in records {
            let stored = StoredRecord {
                timestamp,
                partition_key: record.partition_key.clone(),
                data: record.data.clone(),
            };
            serde_json::to_writer(&mut buf, &stored).map_err(io::Error::other)?;
            buf.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Callers hold the per-stream lock, so batches never interleave.
        file.write_all(&buf)?;

        Ok(records.len())
    }

    pub fn iter_records(&self) -> impl Iterator<Item = StoredRecord> {
        self.read_records().into_iter().flatten()
    }

    fn read_records(&self) -> Option<Vec<StoredRecord>> {
        let file = File::open(&self.path).ok()?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            match line {
                Ok(line) => match serde_json::from_str(&line) {
                    Ok(rec) => records.push(rec),
                    Err(e) => debug!("Skipping malformed stream line: {e}"),
                },
                Err(e) => {
                    debug!("Error reading stream log {}: {e}", self.path.display());
                    break;
                }
            }
        }
        Some(records)
    }

    /// The last `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Record> {
        let records: Vec<StoredRecord> = self.iter_records().collect();
        let skip = records.len().saturating_sub(limit);

        records.into_iter().skip(skip).map(Record::from).collect()
    }
}

/// Stream names become file names, so keep them to a safe alphabet.
pub fn validate_stream_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 128 {
        return Err(format!(
            "stream name must be 1 to 128 characters, got {}",
            name.len()
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        || name.starts_with('.')
    {
        return Err(format!(
            "invalid stream name '{name}': only [A-Za-z0-9_.-] allowed"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
