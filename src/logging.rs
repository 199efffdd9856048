//! File logging setup.
//!
//! The terminal belongs to the UI while the runtime is active, so log records
//! go to a file instead of stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "COG_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs a global subscriber that appends plain-text records to `path`.
///
/// Returns an error if the file cannot be opened or a global subscriber is
/// already installed.
pub fn init_file_logging(path: &Path) -> io::Result<()> {
    let file = open_log_file(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| io::Error::other(error.to_string()))
}
