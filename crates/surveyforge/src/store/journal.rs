//! Deferred file operations.
//!
//! PATCH processing runs inside a database transaction, but filesystem
//! writes cannot be rolled back. Instead of touching the disk mid
//! transaction, sections stage their file operations in a journal that
//! is flushed only after the transaction commits. A rolled-back PATCH
//! simply drops the journal and leaves the disk untouched.

use std::path::{Path, PathBuf};

use super::StorageError;

#[derive(Debug)]
enum FileOp {
    Write { path: PathBuf, bytes: Vec<u8> },
    Delete { path: PathBuf },
}

/// Staged file writes and deletes for one PATCH.
#[derive(Debug, Default)]
pub struct FileJournal {
    ops: Vec<FileOp>,
}

impl FileJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_write(&mut self, path: PathBuf, bytes: Vec<u8>) {
        self.ops.push(FileOp::Write { path, bytes });
    }

    pub fn stage_delete(&mut self, path: PathBuf) {
        self.ops.push(FileOp::Delete { path });
    }

    /// Bytes staged for `path` in this journal, if a write is pending.
    /// Later writes shadow earlier ones.
    pub fn staged_bytes(&self, path: &Path) -> Option<&[u8]> {
        self.ops.iter().rev().find_map(|op| match op {
            FileOp::Write { path: p, bytes } if p == path => Some(bytes.as_slice()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Applies all staged operations in order.
    ///
    /// Called after the database transaction has committed, so a failure
    /// here cannot invalidate the stored configuration; failures are
    /// logged and the remaining operations still run. A missing file on
    /// delete is not an error.
    pub fn commit(self) {
        for op in self.ops {
            match op {
                FileOp::Write { path, bytes } => {
                    if let Err(e) = write_file(&path, &bytes) {
                        log::error!("Failed to write {}: {e}", path.display());
                    }
                }
                FileOp::Delete { path } => match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => log::error!("Failed to delete {}: {e}", path.display()),
                },
            }
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
