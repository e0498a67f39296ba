//! Log file setup. The terminal UI owns stdout, so logs go to a file.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// `<cache_dir>/respnav/respnav.log`
pub fn log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().ok_or(Error::NoCacheDir)?;
    Ok(cache_dir.join("respnav").join("respnav.log"))
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "respnav=debug"
    } else {
        "respnav=info"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `debug`.
/// Returns the log file path.
pub fn init(debug: bool) -> Result<PathBuf> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_raises_default_level() {
        assert_eq!(default_directive(false), "respnav=info");
        assert_eq!(default_directive(true), "respnav=debug");
    }
}
