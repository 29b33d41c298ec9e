//! Config-file discovery and loading.
//!
//! Atelier reads a single json5 config file. A missing file is not an error:
//! callers that want defaults-on-absence use [`load_or_default`].

use crate::{AtelierConfig, ConfigError};
use directories::BaseDirs;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename.
const DEFAULT_CONFIG_FILE: &str = "atelier.json5";
/// Default config directory under the user data dir.
const DEFAULT_CONFIG_DIR: &str = "atelier";

/// Resolve the default config path under the user's data directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = BaseDirs::new().ok_or(ConfigError::NoDataDir)?;
    Ok(base
        .data_dir()
        .join(DEFAULT_CONFIG_DIR)
        .join(DEFAULT_CONFIG_FILE))
}

/// Load and validate a config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AtelierConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let config: AtelierConfig = json5::from_str(&raw)?;
    validate(&config)?;
    info!("loaded config (path={})", path.display());
    Ok(config)
}

/// Load a config file, falling back to defaults when it does not exist.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AtelierConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("config file absent, using defaults (path={})", path.display());
        return Ok(AtelierConfig::default());
    }
    load_config(path)
}

/// Reject configs that cannot drive the pipeline.
fn validate(config: &AtelierConfig) -> Result<(), ConfigError> {
    if config.endpoint.base_url.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            path: "endpoint.base_url".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.admission.min_interval_secs < 0.0 {
        return Err(ConfigError::InvalidField {
            path: "admission.min_interval_secs".to_string(),
            message: "must be non-negative".to_string(),
        });
    }
    if config.admission.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidField {
            path: "admission.poll_interval_ms".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if config.generation.upscale_factor == 0 {
        return Err(ConfigError::InvalidField {
            path: "generation.upscale_factor".to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(())
}
