pub mod ping;
pub mod put;
pub mod read;

use std::path::PathBuf;

use clap::{Args, Subcommand};
pub use ping::PingArgs;
pub use put::PutArgs;
pub use read::ReadArgs;
use spool_runtime::default_socket_path;

use crate::client::CollectorClient;

/// Common error type for command handlers
pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit every line of stdin as a record.
    ///
    /// Example:
    ///   tail -f app.log | spool put --stream app-logs
    ///   spool put --stream clicks --buffer-time 0.2 < events.ndjson
    Put(PutArgs),

    /// Print the most recent records of a stream.
    ///
    /// Example:
    ///   spool read --stream clicks -n 50 --json
    Read(ReadArgs),

    /// Check that the collector is reachable.
    Ping(PingArgs),
}

#[derive(Debug, Args)]
pub struct ConnectOptions {
    /// Path to the collector's Unix socket (optional override)
    #[arg(long, value_name = "PATH")]
    pub socket_path: Option<PathBuf>,
}

impl ConnectOptions {
    pub fn client(&self) -> CollectorClient {
        let path = self.socket_path.clone().unwrap_or_else(default_socket_path);
        CollectorClient::new(path)
    }
}
