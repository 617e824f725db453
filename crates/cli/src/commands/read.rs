use std::process::ExitCode;

use clap::Args;

use crate::commands::{CommandResult, ConnectOptions};
use crate::printer::{OutputFormat, PrintContext, make_printer};

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Stream to read from
    #[arg(long, short = 's')]
    pub stream: String,

    /// Number of most recent records to display
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Output records as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connect: ConnectOptions,
}

pub fn run(args: ReadArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[read] {e}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: ReadArgs) -> CommandResult<ExitCode> {
    let client = args.connect.client();
    let records = client.read_stream(&args.stream, args.limit)?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let mut printer = make_printer(format);
    let ctx = PrintContext {
        stream: &args.stream,
    };

    for record in &records {
        printer.print_record(record, &ctx)?;
    }
    printer.finish(records.len(), &ctx)?;

    Ok(ExitCode::SUCCESS)
}
