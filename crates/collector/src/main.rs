use std::sync::Arc;

mod config;
mod rpc;
mod state;
mod store;

use config::CollectorConfig;
use spool_runtime::logging;
use state::CollectorState;

use log::info;

fn main() -> anyhow::Result<()> {
    logging::init().ok();

    let config = CollectorConfig::from_env()?;

    info!(
        "Starting spool collector: socket={}, data={}",
        config.socket_path.display(),
        config.data_dir.display(),
    );

    let state = Arc::new(CollectorState::new(config)?);
    rpc::run_rpc_server(state)
}
