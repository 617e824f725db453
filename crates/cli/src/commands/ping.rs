use std::process::ExitCode;

use clap::Args;

use crate::commands::ConnectOptions;

#[derive(Debug, Args)]
pub struct PingArgs {
    #[command(flatten)]
    pub connect: ConnectOptions,
}

pub fn run(args: PingArgs) -> ExitCode {
    let client = args.connect.client();

    match client.ping() {
        Ok(()) => {
            println!("collector at {} is alive", client.socket_path().display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ping] {e:#}");
            ExitCode::from(2)
        }
    }
}
