//! Velocity-field checkpoint files.
//!
//! Computing a full-resolution field takes far longer than a typical
//! iteration, so the field can be dumped after each computation and restored
//! on a later run. Checkpoint failures never stop the simulation: they are
//! logged and the run continues without persistence.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use gasgiant_config::CheckpointConfig;

use crate::{CheckpointError, VelocityField};

/// Whether the checkpoint file is written or read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointMode {
    /// Write the field after every computation.
    Dump,
    /// Read the field at startup; never write.
    Restore,
}

/// A checkpoint file location and its direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
    mode: CheckpointMode,
}

impl CheckpointStore {
    /// Create a store for `path`.
    pub fn new(path: impl Into<PathBuf>, mode: CheckpointMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    /// Create a store from the checkpoint section of the configuration.
    pub fn from_config(config: &CheckpointConfig) -> Self {
        let mode = if config.restore {
            CheckpointMode::Restore
        } else {
            CheckpointMode::Dump
        };
        Self::new(config.path.clone(), mode)
    }

    /// Base path of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direction of the store.
    pub fn mode(&self) -> CheckpointMode {
        self.mode
    }

    /// File a dump goes to: the base path, or `<path>-<step>` when the field
    /// is being time-stepped.
    pub fn path_for_step(&self, step: Option<u32>) -> PathBuf {
        match step {
            None => self.path.clone(),
            Some(step) => {
                let mut name = OsString::from(self.path.as_os_str());
                name.push(format!("-{step}"));
                PathBuf::from(name)
            }
        }
    }

    /// Log if a dump would collide with an existing file. Dumps never
    /// overwrite, so the existing file is kept and that dump is skipped.
    ///
    /// Returns `true` if the warning was emitted.
    pub fn warn_if_existing(&self) -> bool {
        if self.mode == CheckpointMode::Dump && self.path.exists() {
            tracing::warn!(
                path = %self.path.display(),
                "File already exists, velocity field will not be dumped"
            );
            return true;
        }
        false
    }

    /// Dump `field` unless this store is in restore mode. Failures are logged.
    ///
    /// Returns the path written, if any.
    pub fn dump(&self, field: &VelocityField, step: Option<u32>) -> Option<PathBuf> {
        if self.mode == CheckpointMode::Restore {
            return None;
        }
        let path = self.path_for_step(step);
        match write_field(&path, field) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Velocity field dumped");
                Some(path)
            }
            Err(err) => {
                tracing::warn!("{err}. Velocity field not dumped.");
                None
            }
        }
    }

    /// Restore a field of resolution `dim` if this store is in restore mode.
    /// Failures are logged and yield `None` so the caller can recompute.
    pub fn restore(&self, dim: usize) -> Option<VelocityField> {
        if self.mode != CheckpointMode::Restore {
            return None;
        }
        match read_field(&self.path, dim) {
            Ok(field) => {
                tracing::info!(path = %self.path.display(), "Velocity field restored");
                Some(field)
            }
            Err(err) => {
                tracing::warn!("{err}. Velocity field restoration failed.");
                None
            }
        }
    }
}

/// Write `field` to a new file at `path`. Fails if the file already exists.
pub fn write_field(path: &Path, field: &VelocityField) -> Result<(), CheckpointError> {
    let io_err = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(field.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)
}

/// Read a field of resolution `dim` from `path`.
///
/// The file must hold exactly one field of that resolution. Its contents are
/// read straight into the new field's storage.
pub fn read_field(path: &Path, dim: usize) -> Result<VelocityField, CheckpointError> {
    let io_err = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let actual = file.metadata().map_err(io_err)?.len();

    let mut field = VelocityField::new(dim);
    let expected = VelocityField::byte_len(field.dim());
    if actual != expected as u64 {
        return Err(CheckpointError::SizeMismatch {
            expected,
            actual: usize::try_from(actual).unwrap_or(usize::MAX),
        });
    }
    file.read_exact(field.as_bytes_mut()).map_err(io_err)?;
    Ok(field)
}
