//! Storage infrastructure: where document bytes live.
//!
//! [`ConfigDocument`](crate::ConfigDocument) never touches the file system
//! directly.  It goes through a [`DocumentStore`], which keeps persistence
//! behind one small seam:
//!
//! - [`FileStore`] is the real implementation.  Every write lands in a
//!   temporary file next to the target and is then renamed over it, so a
//!   crash or a failed write can never leave a half-written config behind.
//! - Tests substitute their own store to simulate unwritable paths without
//!   depending on file permissions.

use std::io;
use std::path::Path;

pub mod file;

pub use file::FileStore;

/// Byte-level persistence for a single configuration document.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore {
    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file at `path` with `bytes`.
    ///
    /// Implementations must be atomic: on error the previous contents of
    /// `path` are left untouched.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Removes the file at `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;
}
