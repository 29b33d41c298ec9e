//! Configuration models, config-file loading, and persisted user settings.
//!
//! This crate owns the Atelier config schema and the small JSON settings
//! store shared by the pipeline and the history store.

mod error;
mod loader;
mod model;
mod settings;

/// Public error type returned by config loading and settings APIs.
pub use error::ConfigError;
/// Config loading helpers.
pub use loader::{default_config_path, load_config, load_or_default};
/// Configuration schema models.
pub use model::*;
/// Persisted key-value settings store and its well-known keys.
pub use settings::{CUSTOM_PROMPT_KEY, GENERATION_SETTINGS_KEY, SettingsStore};
