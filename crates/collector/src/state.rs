use std::{
    collections::HashMap,
    fs,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use log::debug;
use spool_protocol::{PutRecordsRequest, PutRecordsResponse, Record};

use crate::config::CollectorConfig;
use crate::store::{StreamStore, validate_stream_name};

pub struct CollectorState {
    pub config: CollectorConfig,
    streams: Mutex<HashMap<String, Arc<Mutex<StreamStore>>>>,
}

impl CollectorState {
    pub fn new(config: CollectorConfig) -> anyhow::Result<Self> {
        fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                config.data_dir.display()
            )
        })?;

        Ok(Self {
            config,
            streams: Mutex::new(HashMap::new()),
        })
    }

    fn stream(&self, name: &str) -> Result<Arc<Mutex<StreamStore>>, String> {
        validate_stream_name(name)?;

        let mut streams = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        let store = streams.entry(name.to_string()).or_insert_with(|| {
            let path = self.config.data_dir.join(format!("{name}.jsonl"));
            debug!("Opening stream {name} at {}", path.display());
            Arc::new(Mutex::new(StreamStore::new(path)))
        });

        Ok(Arc::clone(store))
    }

    pub fn put_records(&self, req: &PutRecordsRequest) -> Result<PutRecordsResponse, String> {
        let store = self.stream(&req.stream_name)?;
        let store = store.lock().unwrap_or_else(|e| e.into_inner());

        let written = store
            .append(&req.records)
            .map_err(|e| format!("failed to append to stream {}: {e}", req.stream_name))?;

        debug!(
            "Appended {written} records to {}",
            store.path().display()
        );

        Ok(PutRecordsResponse {
            failed_record_count: 0,
        })
    }

    pub fn read_stream(&self, name: &str, limit: usize) -> Result<Vec<Record>, String> {
        let store = self.stream(name)?;
        let store = store.lock().unwrap_or_else(|e| e.into_inner());
        Ok(store.recent(limit))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
