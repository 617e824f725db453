mod config;
pub mod logging;

pub use config::{
    PROGRAM_NAME, default_data_dir, default_socket_path, spool_dir, xdg_or_home,
};

pub use logging::init;
