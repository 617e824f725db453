use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::{Mutex, OnceLock},
    thread,
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_FILE, PROGRAM_LOG_LEVEL};

enum LogTarget {
    Stderr,
    File(Mutex<File>),
}

pub struct Logger {
    level: Level,
    target: LogTarget,
}

impl Logger {
    fn format_line(&self, record: &Record<'_>) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let current = thread::current();
        let thread_name = current.name().unwrap_or("unnamed");

        format!(
            "{} {} [{}] [{}] {}",
            timestamp,
            record.level(),
            thread_name,
            record.target(),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(record);

        match &self.target {
            LogTarget::Stderr => eprintln!("{line}"),
            LogTarget::File(file) => {
                // A poisoned lock only means another thread panicked mid-write.
                let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
                if writeln!(file, "{line}").is_err() {
                    eprintln!("{line}");
                }
            }
        }
    }

    fn flush(&self) {
        if let LogTarget::File(file) = &self.target {
            let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
            let _ = file.flush();
        }
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

fn get_target_from_env() -> LogTarget {
    let Some(path) = std::env::var_os(PROGRAM_LOG_FILE)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
    else {
        return LogTarget::Stderr;
    };

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => LogTarget::File(Mutex::new(file)),
        Err(e) => {
            eprintln!(
                "cannot open log file {}: {e}; logging to stderr",
                path.display()
            );
            LogTarget::Stderr
        }
    }
}

/// Install the process-wide logger configured from `SPOOL_LOG_LEVEL` and
/// `SPOOL_LOG_FILE`. Library crates only emit through `log`; binaries call this.
pub fn init() -> Result<(), SetLoggerError> {
    _init(get_level_from_env(), get_target_from_env())
}

fn _init(level: Level, target: LogTarget) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Only the first call installs; later calls keep the original level so
    // that set_max_level never disagrees with the stored logger.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger { level, target });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
