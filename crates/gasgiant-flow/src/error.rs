//! Velocity-field checkpoint error types.

use std::path::PathBuf;

/// Errors that can occur when writing or reading a velocity-field checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Failed to create, write or read the checkpoint file.
    #[error("checkpoint I/O on '{path}': {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dump does not hold exactly one field of the expected resolution.
    #[error("checkpoint holds {actual} bytes, expected {expected} for the configured field size")]
    SizeMismatch {
        /// Byte length of a field at the configured resolution.
        expected: usize,
        /// Byte length actually found.
        actual: usize,
    },
}
