//! File system backed [`DocumentStore`] with atomic replacement.
//!
//! # Why write to a temporary file first? (for beginners)
//!
//! Writing straight into the target file truncates it before the new bytes
//! arrive.  If the process dies, or the disk fills up half way through, the
//! config is left empty or cut off.  Instead we:
//!
//! 1. create a temporary file in the *same directory* as the target,
//! 2. write and `fsync` the new contents into it,
//! 3. rename it over the target.
//!
//! A rename within one file system is atomic: readers see either the old
//! file or the new one, never a mix.  If any step fails the temporary file
//! is deleted when it is dropped and the target keeps its old contents.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::DocumentStore;

/// Stores documents as plain files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    /// Creates a new file store.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentStore for FileStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        // NamedTempFile is created 0600; keep whatever mode the old file had.
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "replaced file atomically");
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
