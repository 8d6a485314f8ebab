//! File system abstraction for hclmerge
//!
//! Provides the byte-oriented read/write seam the merge orchestrator works
//! against, with a real (atomic-writing) backend and an in-memory one.

pub mod error;
pub mod io;
pub mod memory;
pub mod path;

pub use error::{Error, Result};
pub use memory::MemoryFileSystem;
pub use path::NormalizedPath;

/// Byte storage used to read input documents and write the merged result.
///
/// Implementations decide where bytes live; callers only deal in
/// [`NormalizedPath`]s.
pub trait FileSystem: Send + Sync {
    /// Read the full content at `path`.
    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>>;

    /// Replace the content at `path`, creating it if needed.
    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()>;

    /// Whether `path` currently holds content.
    fn exists(&self, path: &NormalizedPath) -> bool;
}

/// The host file system. Writes go through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        io::read_bytes(path)
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        path.is_file()
    }
}
