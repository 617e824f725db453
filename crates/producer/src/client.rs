use std::sync::Arc;

use anyhow::Result;
use spool_protocol::{PutRecordsResponse, Record};

/// The remote "put batch of records" capability.
///
/// One call per flushed batch. An `Err` means the whole call failed; records the
/// stream rejected individually are reported through
/// [`PutRecordsResponse::failed_record_count`].
pub trait PutRecords: Send + Sync {
    fn put_records(&self, stream_name: &str, records: &[Record]) -> Result<PutRecordsResponse>;
}

impl<T: PutRecords + ?Sized> PutRecords for Arc<T> {
    fn put_records(&self, stream_name: &str, records: &[Record]) -> Result<PutRecordsResponse> {
        (**self).put_records(stream_name, records)
    }
}

impl<T: PutRecords + ?Sized> PutRecords for Box<T> {
    fn put_records(&self, stream_name: &str, records: &[Record]) -> Result<PutRecordsResponse> {
        (**self).put_records(stream_name, records)
    }
}
