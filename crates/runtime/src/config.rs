use std::{env, path::PathBuf};

pub const PROGRAM_NAME: &str = "spool";
pub const PROGRAM_LOG_LEVEL: &str = "SPOOL_LOG_LEVEL";
pub const PROGRAM_LOG_FILE: &str = "SPOOL_LOG_FILE";
pub const SOCKET_FILE_NAME: &str = "collector.sock";

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = env::var_os(xdg_var).filter(|d| !d.is_empty()) {
        PathBuf::from(dir)
    } else {
        env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix)
    }
}

/// Runtime directory holding the collector socket.
pub fn spool_dir() -> PathBuf {
    xdg_or_home("XDG_CACHE_HOME", ".cache").join(PROGRAM_NAME)
}

pub fn default_socket_path() -> PathBuf {
    spool_dir().join(SOCKET_FILE_NAME)
}

/// Directory where the collector keeps one log file per stream.
pub fn default_data_dir() -> PathBuf {
    // Check XDG_STATE_HOME first (Linux)
    if let Ok(xdg_state) = env::var("XDG_STATE_HOME")
        && !xdg_state.is_empty()
    {
        return PathBuf::from(xdg_state).join(PROGRAM_NAME);
    }

    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join(PROGRAM_NAME))
        .unwrap_or_else(|| spool_dir().join("streams"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
