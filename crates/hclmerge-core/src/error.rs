//! Error types for hclmerge-core

use std::path::PathBuf;

/// Result type for hclmerge-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the file-level merge. The merge itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("error reading source file {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: hclmerge_fs::Error,
    },

    #[error("error reading destination file {path}: {source}")]
    ReadDestination {
        path: PathBuf,
        #[source]
        source: hclmerge_fs::Error,
    },

    #[error("error parsing {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: hclmerge_syntax::Error,
    },

    #[error("error writing destination file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: hclmerge_fs::Error,
    },

    #[error("error writing merged output: {0}")]
    Output(#[from] std::io::Error),
}
