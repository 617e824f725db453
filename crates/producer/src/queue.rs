use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Outcome of a single poll on the record queue.
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued {
    Payload(Vec<u8>),
    /// Nothing arrived before the timeout. Not an error.
    Empty,
    /// Every sending handle has been dropped and the queue is drained.
    Closed,
}

/// Create the unbounded queue shared by callers and the worker.
pub fn channel() -> (QueueHandle, RecordQueue) {
    let (tx, rx) = channel::unbounded();
    (QueueHandle { tx }, RecordQueue { rx })
}

/// Sending half. Cheap to clone and safe to use from any number of threads.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    tx: Sender<Vec<u8>>,
}

impl QueueHandle {
    /// Never blocks. Fails only once the consuming worker has gone away.
    pub fn enqueue(&self, payload: Vec<u8>) -> Result<()> {
        self.tx
            .send(payload)
            .map_err(|_| anyhow!("record queue is closed"))
    }

    /// Advisory; may be stale by the time the caller acts on it.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Receiving half, owned by the worker.
#[derive(Debug)]
pub struct RecordQueue {
    rx: Receiver<Vec<u8>>,
}

impl RecordQueue {
    pub fn dequeue(&self, timeout: Duration) -> Dequeued {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => Dequeued::Payload(payload),
            Err(RecvTimeoutError::Timeout) => Dequeued::Empty,
            Err(RecvTimeoutError::Disconnected) => Dequeued::Closed,
        }
    }

    pub fn try_dequeue(&self) -> Dequeued {
        match self.rx.try_recv() {
            Ok(payload) => Dequeued::Payload(payload),
            Err(TryRecvError::Empty) => Dequeued::Empty,
            Err(TryRecvError::Disconnected) => Dequeued::Closed,
        }
    }

    /// Best-effort termination hint, never a synchronization point.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
