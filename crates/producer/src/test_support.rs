use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Result, bail};
use crossbeam::channel::{self, Receiver, Sender};
use spool_protocol::{PutRecordsResponse, Record};

use crate::client::PutRecords;

#[derive(Debug)]
pub struct PutCall {
    pub stream_name: String,
    pub records: Vec<Record>,
    pub at: Instant,
}

impl PutCall {
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.records.iter().map(|r| r.data.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Misbehave {
    Fail,
    Panic,
}

/// Forwards every successful `put_records` call to a channel so tests can
/// wait on flushes. Optionally fails or panics on the first few calls.
pub struct RecordingClient {
    tx: Sender<PutCall>,
    misbehave: Option<Misbehave>,
    remaining: AtomicUsize,
    rejected_per_call: u32,
}

impl RecordingClient {
    pub fn new() -> (Self, Receiver<PutCall>) {
        let (tx, rx) = channel::unbounded();
        let client = Self {
            tx,
            misbehave: None,
            remaining: AtomicUsize::new(0),
            rejected_per_call: 0,
        };
        (client, rx)
    }

    pub fn failing_first(calls: usize) -> (Self, Receiver<PutCall>) {
        let (mut client, rx) = Self::new();
        client.misbehave = Some(Misbehave::Fail);
        client.remaining = AtomicUsize::new(calls);
        (client, rx)
    }

    pub fn panicking_first(calls: usize) -> (Self, Receiver<PutCall>) {
        let (mut client, rx) = Self::new();
        client.misbehave = Some(Misbehave::Panic);
        client.remaining = AtomicUsize::new(calls);
        (client, rx)
    }

    pub fn rejecting(rejected_per_call: u32) -> (Self, Receiver<PutCall>) {
        let (mut client, rx) = Self::new();
        client.rejected_per_call = rejected_per_call;
        (client, rx)
    }
}

impl PutRecords for RecordingClient {
    fn put_records(&self, stream_name: &str, records: &[Record]) -> Result<PutRecordsResponse> {
        let misbehave_now = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        match (misbehave_now, self.misbehave) {
            (true, Some(Misbehave::Fail)) => bail!("stream throttled"),
            (true, Some(Misbehave::Panic)) => panic!("client blew up"),
            _ => {}
        }

        let _ = self.tx.send(PutCall {
            stream_name: stream_name.to_string(),
            records: records.to_vec(),
            at: Instant::now(),
        });

        Ok(PutRecordsResponse {
            failed_record_count: self.rejected_per_call,
        })
    }
}
