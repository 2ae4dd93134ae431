//! Failures while reading or writing a generator config file.

use std::path::PathBuf;

/// A config file could not be loaded or saved.
///
/// Path-carrying variants name the file so the CLI can report it directly.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read generator config {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for a generator config.
    #[error("invalid generator config {}: {source}", path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The config file or its directory could not be written.
    #[error("cannot write generator config {}: {source}", path.display())]
    Write {
        /// Destination file, or the parent directory that failed to be created.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory config could not be encoded as RON.
    #[error("cannot encode generator config as RON: {0}")]
    Encode(#[source] ron::Error),
}
