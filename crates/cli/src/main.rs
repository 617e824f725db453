use std::process::ExitCode;

use clap::Parser;

mod client;
mod commands;
mod printer;

use commands::Command;
use spool_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "spool", version, about = "Buffered producer for append-only streams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Put(args) => commands::put::run(args),
        Command::Read(args) => commands::read::run(args),
        Command::Ping(args) => commands::ping::run(args),
    }
}
