//! Diagnostic logging setup.
//!
//! The interactive UI owns stdout and stderr, so tracing output goes to a
//! file or nowhere at all.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing_subscriber` filter directive.
pub const LOG_FILTER_ENV: &str = "CHAIT_LOG";

/// Filter used when `CHAIT_LOG` is unset.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "chait=debug"
    } else {
        "chait=info"
    }
}

fn build_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter(debug)))
}

/// Installs a global subscriber appending to `path`.
///
/// Fails when the file cannot be opened or a subscriber is already set.
pub fn init_file_logging(path: &Path, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(debug))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| -> Box<dyn std::error::Error> { err })?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging initialised");
    Ok(())
}
