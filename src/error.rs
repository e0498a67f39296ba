//! Error type for the library's I/O boundaries (fixtures, preference files, config).
//!
//! Engine operations never fail; only loading and persisting state can.

use std::path::PathBuf;

/// Errors surfaced when reading or writing files owned by respnav.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not find a config directory")]
    NoConfigDir,

    #[error("could not find a cache directory")]
    NoCacheDir,
}

pub type Result<T> = std::result::Result<T, Error>;
