use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use spool_producer::PutRecords;
use spool_protocol::codec::{read_message, write_message};
use spool_protocol::{
    CollectorRequest, CollectorResponse, PutRecordsRequest, PutRecordsResponse, Record,
};

/// Talks to `spool-collector` over its Unix socket, one connection per request.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    socket_path: PathBuf,
}

impl CollectorClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn request(&self, req: &CollectorRequest) -> Result<CollectorResponse> {
        let mut stream = UnixStream::connect(&self.socket_path).with_context(|| {
            format!(
                "failed to connect to spool collector at {}",
                self.socket_path.display()
            )
        })?;

        write_message(&mut stream, req).context("failed to send request")?;
        read_message(&mut stream).context("failed to read collector response")
    }

    pub fn ping(&self) -> Result<()> {
        match self.request(&CollectorRequest::Ping)? {
            CollectorResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn read_stream(&self, stream_name: &str, limit: usize) -> Result<Vec<Record>> {
        let req = CollectorRequest::ReadStream {
            stream_name: stream_name.to_string(),
            limit,
        };

        match self.request(&req)? {
            CollectorResponse::Records(records) => Ok(records),
            other => Err(unexpected(other)),
        }
    }
}

impl PutRecords for CollectorClient {
    fn put_records(&self, stream_name: &str, records: &[Record]) -> Result<PutRecordsResponse> {
        let req = CollectorRequest::PutRecords(PutRecordsRequest {
            stream_name: stream_name.to_string(),
            records: records.to_vec(),
        });

        match self.request(&req)? {
            CollectorResponse::Put(resp) => Ok(resp),
            CollectorResponse::Error(msg) => bail!("collector rejected batch: {msg}"),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(resp: CollectorResponse) -> anyhow::Error {
    match resp {
        CollectorResponse::Error(msg) => anyhow!("collector error: {msg}"),
        other => anyhow!("unexpected collector response: {other:?}"),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
