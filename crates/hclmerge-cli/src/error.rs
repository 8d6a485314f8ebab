//! Error types for hclmerge-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from hclmerge-core
    #[error(transparent)]
    Core(#[from] hclmerge_core::Error),

    /// Invalid command line
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("failed to set up logging: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}
