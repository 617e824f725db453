pub mod codec;

use serde::{Deserialize, Serialize};

/// A payload paired with the key the stream uses to route it to a shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: Vec<u8>,
    pub partition_key: String,
}

impl Record {
    pub fn new(data: Vec<u8>, partition_key: String) -> Self {
        Self {
            data,
            partition_key,
        }
    }

    /// Approximate size counted against the batch limit: payload plus key bytes.
    pub fn estimated_size(&self) -> usize {
        self.data.len() + self.partition_key.len()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutRecordsRequest {
    pub stream_name: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PutRecordsResponse {
    /// Records the stream rejected individually; the call itself succeeded.
    pub failed_record_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum CollectorRequest {
    Ping,
    PutRecords(PutRecordsRequest),
    ReadStream { stream_name: String, limit: usize },
}

#[derive(Debug, Serialize, Deserialize)]
pub enum CollectorResponse {
    Pong,
    Put(PutRecordsResponse),
    Records(Vec<Record>),
    Error(String),
}
