use std::io;
use std::path::Path;

use thiserror::Error;

use crate::record::FileTimestamps;

#[cfg(not(windows))]
use super::basic::BasicStore;
#[cfg(windows)]
use super::{basic::BasicStore, full::FullStore};

/// Uniform access to a file's timestamps, dispatched over the platform
/// capabilities probed at startup.
pub trait TimestampStore {
    /// Reads the timestamps of the file at `path` into a fresh record.
    fn read(&self, path: &Path) -> Result<FileTimestamps, AccessError>;

    /// Writes the writable fields of `times` to the file at `path`. The
    /// record is expected to already hold the target values.
    fn write(&self, path: &Path, times: &FileTimestamps) -> Result<WriteOutcome, WriteError>;
}

/// What a write managed to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every field the platform exposes was updated.
    Complete,
    /// Modification and access times were updated; creation time was left
    /// unchanged because the handle API is unavailable.
    CreationUnchanged,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error(transparent)]
    Io(io::Error),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for AccessError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

/// Selects the most capable store for `path`. Probed once per process; the
/// choice is not revisited on later calls.
#[cfg(windows)]
pub fn detect(path: &Path) -> Box<dyn TimestampStore> {
    match FullStore::probe(path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            log::warn!("creation time unavailable, falling back to basic access: {err}");
            Box::new(BasicStore)
        }
    }
}

/// Selects the most capable store for `path`. Non-Windows targets have no
/// handle API to probe for, so this is always the basic store.
#[cfg(not(windows))]
pub fn detect(_path: &Path) -> Box<dyn TimestampStore> {
    Box::new(BasicStore)
}
