//! In-memory file system backend

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{Error, FileSystem, NormalizedPath, Result};

/// A [`FileSystem`] keeping every file in a map. Used to exercise the merge
/// pipeline without touching disk.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<NormalizedPath, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, replacing any previous content.
    pub fn insert(&self, path: impl Into<NormalizedPath>, content: impl Into<Vec<u8>>) {
        self.files().insert(path.into(), content.into());
    }

    /// Content of a file as UTF-8 text, if present.
    pub fn read_to_string(&self, path: impl Into<NormalizedPath>) -> Option<String> {
        self.files()
            .get(&path.into())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn files(&self) -> MutexGuard<'_, HashMap<NormalizedPath, Vec<u8>>> {
        // A poisoned map still holds consistent bytes; every write is a single insert.
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: path.to_native(),
            })
    }

    fn write(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        if path.as_str().is_empty() || path.as_str().ends_with('/') {
            return Err(Error::io(
                path.to_native(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            ));
        }
        self.files().insert(path.clone(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        self.files().contains_key(path)
    }
}
