use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spool_runtime::{default_data_dir, default_socket_path};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    // Unix domain socket path
    pub socket_path: PathBuf,
    // One <stream>.jsonl file per stream lives here
    pub data_dir: PathBuf,
}

#[derive(Debug, Parser)]
#[command(name = "spool-collector", about = "Local stream collector for spool")]
pub struct Cli {
    /// Path to Unix domain socket (optional override)
    #[arg(long)]
    pub socket_path: Option<PathBuf>,

    /// Directory for stream logs (optional override)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl CollectorConfig {
    pub fn from_args(args: &Cli) -> Result<Self> {
        let socket_path = args.socket_path.clone().unwrap_or_else(default_socket_path);
        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);

        Ok(Self {
            socket_path,
            data_dir,
        })
    }

    pub fn from_env() -> Result<Self> {
        let args = Cli::parse();
        Self::from_args(&args)
    }
}
