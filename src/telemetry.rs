//! Structured logging setup
//!
//! The TUI owns the terminal, so interactive sessions log to a file in the
//! cache directory. One-shot `--json` runs log to stderr.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name inside the cache directory
pub const LOG_FILE_NAME: &str = "wxticker.log";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// Logging disabled (no writable location)
    Off,
}

impl LogTarget {
    /// Log file inside `dir`
    pub fn file_in(dir: &Path) -> Self {
        LogTarget::File(dir.join(LOG_FILE_NAME))
    }
}

/// Builds the filter; `RUST_LOG` wins over `level`
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging with the given level and target
pub fn init_logging(level: &str, target: &LogTarget) -> Result<(), Box<dyn std::error::Error>> {
    match target {
        LogTarget::Off => Ok(()),
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter(level))
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
            Ok(())
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(env_filter(level))
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?;
            Ok(())
        }
    }
}
