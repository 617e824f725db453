use std::io::{self, BufRead};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, warn};
use spool_producer::{Producer, ProducerConfig};

use crate::commands::{CommandResult, ConnectOptions};
use crate::printer::{OutputFormat, PrintContext, make_printer};

/// How often the input loop re-checks for a shutdown signal while stdin is idle.
const SIGNAL_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Args)]
pub struct PutArgs {
    /// Target stream
    #[arg(long, short = 's')]
    pub stream: String,

    /// Buffering window in seconds (default 0.5, or SPOOL_BUFFER_TIME)
    #[arg(long, value_name = "SECS")]
    pub buffer_time: Option<f64>,

    /// Estimated bytes at which a batch is cut early (default 1 MiB)
    #[arg(long, value_name = "BYTES")]
    pub max_batch_size: Option<usize>,

    /// Records per batch (default 500)
    #[arg(long, value_name = "N")]
    pub max_batch_records: Option<usize>,

    /// Print the delivery summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connect: ConnectOptions,
}

impl PutArgs {
    fn producer_config(&self) -> anyhow::Result<ProducerConfig> {
        let mut config = ProducerConfig::from_env(self.stream.clone())?;

        if let Some(secs) = self.buffer_time {
            config = config.buffer_time_secs(secs)?;
        }
        if let Some(bytes) = self.max_batch_size {
            config = config.with_max_batch_size(bytes);
        }
        if let Some(count) = self.max_batch_records {
            config = config.with_max_batch_records(count);
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(args: PutArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[put] {e}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: PutArgs) -> CommandResult<ExitCode> {
    let config = args.producer_config()?;
    let client = args.connect.client();
    client.ping().context("collector is not reachable")?;

    let producer = Producer::new(config, client)?;
    producer.register_signal_handlers()?;

    let (line_tx, line_rx) = channel::unbounded();
    // stdin reads cannot be interrupted, so they run apart from the submit loop.
    thread::Builder::new()
        .name("spool-stdin".into())
        .spawn(move || read_lines(io::stdin().lock(), line_tx))?;

    loop {
        if producer.stop_requested() {
            warn!("interrupted; flushing {} pending records", producer.pending());
            break;
        }

        match line_rx.recv_timeout(SIGNAL_POLL) {
            Ok(line) => {
                // A signal can land between the check above and this submit.
                if let Err(e) = producer.submit(line) {
                    warn!("{e:#}");
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("stdin closed");
                break;
            }
        }
    }

    producer.shutdown()?;

    let stats = producer.stats();
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    make_printer(format).print_stats(
        &stats,
        &PrintContext {
            stream: producer.stream_name(),
        },
    )?;

    if stats.records_failed > 0 || stats.records_rejected > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Forward non-empty lines until EOF, a read error, or the receiver is gone.
fn read_lines<R: BufRead>(reader: R, tx: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) if line.is_empty() => continue,
            Ok(line) => {
                if tx.send(line).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("failed to read stdin: {e}");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "put_tests.rs"]
mod tests;
