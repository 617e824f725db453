use std::io::{self, Write};

use spool_producer::StatsSnapshot;
use spool_protocol::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Static context about a print run.
#[derive(Debug)]
pub struct PrintContext<'a> {
    pub stream: &'a str,
}

/// Output sink for records read back from a stream and for delivery stats.
pub trait RecordPrinter {
    fn print_record(&mut self, record: &Record, ctx: &PrintContext) -> io::Result<()>;

    /// Called once after all records are printed.
    fn finish(&mut self, printed: usize, ctx: &PrintContext) -> io::Result<()>;

    fn print_stats(&mut self, stats: &StatsSnapshot, ctx: &PrintContext) -> io::Result<()>;
}

pub fn make_printer(format: OutputFormat) -> Box<dyn RecordPrinter> {
    match format {
        OutputFormat::Human => Box::new(HumanPrinter::new(io::stdout(), io::stderr())),
        OutputFormat::Json => Box::new(JsonPrinter::new(io::stdout(), io::stderr())),
    }
}

pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }
}

impl<W: Write, E: Write> RecordPrinter for HumanPrinter<W, E> {
    fn print_record(&mut self, record: &Record, _ctx: &PrintContext) -> io::Result<()> {
        writeln!(
            self.out,
            "{}\t{}",
            record.partition_key,
            String::from_utf8_lossy(&record.data)
        )
    }

    fn finish(&mut self, printed: usize, ctx: &PrintContext) -> io::Result<()> {
        if printed == 0 {
            writeln!(self.err, "[read] stream {} has no records", ctx.stream)?;
        }
        Ok(())
    }

    fn print_stats(&mut self, stats: &StatsSnapshot, ctx: &PrintContext) -> io::Result<()> {
        writeln!(
            self.err,
            "[put] {}: {} accepted, {} submitted in {} batches, {} failed ({} batches), {} rejected",
            ctx.stream,
            stats.records_accepted,
            stats.records_submitted,
            stats.batches_flushed,
            stats.records_failed,
            stats.batches_failed,
            stats.records_rejected,
        )
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }
}

impl<W: Write, E: Write> RecordPrinter for JsonPrinter<W, E> {
    fn print_record(&mut self, record: &Record, ctx: &PrintContext) -> io::Result<()> {
        let obj = serde_json::json!({
            "stream": ctx.stream,
            "partition_key": record.partition_key,
            "data": String::from_utf8_lossy(&record.data),
            "bytes": record.data.len(),
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, _printed: usize, _ctx: &PrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_stats(&mut self, stats: &StatsSnapshot, ctx: &PrintContext) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "summary",
            "stream": ctx.stream,
            "stats": stats,
        });
        writeln!(self.err, "{}", obj)
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
