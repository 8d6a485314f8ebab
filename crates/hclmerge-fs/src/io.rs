//! Host file system I/O with atomic, locked writes

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Read the raw bytes of a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    tracing::debug!(path = %path, "reading file");
    fs::read(&native_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound { path: native_path },
        _ => Error::io(&native_path, e),
    })
}

/// Write content atomically to a file with locking.
///
/// Content goes to a temp file in the target directory first and is renamed
/// over the target, so readers never observe a partially merged document.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();
    let Some(file_name) = path.file_name() else {
        return Err(Error::io(
            native_path,
            std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
        ));
    };

    if let Some(parent) = path.parent() {
        let parent = parent.to_native();
        fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;
    }

    let temp_path =
        native_path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all())
        .map_err(|e| Error::io(&temp_path, e));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    if let Err(e) = fs::rename(&temp_path, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&native_path, e));
    }

    tracing::debug!(path = %path, bytes = content.len(), "wrote file");
    Ok(())
}
