//! Error types for history operations.

use atelier_config::ConfigError;

/// Errors returned by the history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// IO error while writing or deleting image files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Persisting the index to the settings store failed.
    #[error("index error: {0}")]
    Index(#[from] ConfigError),
}
