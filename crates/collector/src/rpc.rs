use std::fs;
use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{debug, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use spool_protocol::codec::{read_message, write_message};
use spool_protocol::{CollectorRequest, CollectorResponse};

use crate::state::CollectorState;

const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// RAII guard that ensures the Unix socket file is removed on shutdown,
/// even if we return early or panic.
struct SocketGuard<'a> {
    path: &'a Path,
}

impl<'a> Drop for SocketGuard<'a> {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                error!(
                    "Failed to remove Unix socket at {} on shutdown: {err}",
                    self.path.display()
                );
            }
        }
    }
}

pub fn run_rpc_server(state: Arc<CollectorState>) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));

    // Signal handlers only set the atomic flag
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, Arc::clone(&shutdown))
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }

    serve(state, &shutdown)
}

fn serve(state: Arc<CollectorState>, shutdown: &AtomicBool) -> anyhow::Result<()> {
    let socket_path = &state.config.socket_path;

    if let Some(parent) = socket_path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create socket directory {}", parent.display())
        })?;
    }

    // Clean up stale socket if it exists.
    if socket_path.exists() {
        fs::remove_file(socket_path).with_context(|| {
            format!(
                "Failed to remove existing socket at {}",
                socket_path.display()
            )
        })?;
    }

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind Unix socket at {}", socket_path.display()))?;

    // Non-blocking accept so the shutdown flag is observed even when idle;
    // signal-hook installs its handlers with SA_RESTART.
    listener
        .set_nonblocking(true)
        .context("Failed to make listener non-blocking")?;

    let _socket_guard = SocketGuard {
        path: socket_path.as_path(),
    };

    info!("spool collector listening on {}", socket_path.display());

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Shutdown signal observed; stopping collector.");
            break;
        }

        match listener.accept() {
            Ok((stream, _addr)) => {
                let state = state.clone();
                thread::spawn(move || {
                    if let Err(err) = handle_client(stream, &state) {
                        error!("Error while handling client: {err:#}");
                    }
                });
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                error!("Accept error: {err}");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }

    info!("Collector shutdown complete.");
    Ok(())
}

fn handle_client(mut stream: UnixStream, state: &CollectorState) -> anyhow::Result<()> {
    stream
        .set_nonblocking(false)
        .context("Failed to make client stream blocking")?;

    let request: CollectorRequest =
        read_message(&mut stream).context("Failed to read CollectorRequest")?;

    let response = dispatch(request, state);

    write_message(&mut stream, &response).context("Failed to write CollectorResponse")
}

fn dispatch(request: CollectorRequest, state: &CollectorState) -> CollectorResponse {
    match request {
        CollectorRequest::Ping => CollectorResponse::Pong,
        CollectorRequest::PutRecords(req) => {
            debug!(
                "PutRecords: {} records for {}",
                req.records.len(),
                req.stream_name
            );
            match state.put_records(&req) {
                Ok(resp) => CollectorResponse::Put(resp),
                Err(msg) => CollectorResponse::Error(msg),
            }
        }
        CollectorRequest::ReadStream { stream_name, limit } => {
            match state.read_stream(&stream_name, limit) {
                Ok(records) => CollectorResponse::Records(records),
                Err(msg) => CollectorResponse::Error(msg),
            }
        }
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
