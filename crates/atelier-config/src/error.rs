//! Error types for config loading and settings persistence.

use thiserror::Error;

/// Errors returned while loading config or touching the settings store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config or settings file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific field failed validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// No home directory could be resolved for the default paths.
    #[error("could not resolve a data directory for this user")]
    NoDataDir,
}
