//! Configuration Loading for the UE radio link
//!
//! Reads a [`LinkConfig`] from YAML and validates it before the RLS task is
//! built from it.
//!
//! # Example
//!
//! ```rust,ignore
//! use linksim_ue::app::load_link_config;
//!
//! let config = load_link_config("config/ue-link.yaml")?;
//! println!("Search space: {:?}", config.gnb_search_list);
//! ```

use std::path::Path;

use linksim_common::{ConfigValidationError, LinkConfig};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Loads and validates a link configuration from a YAML file.
pub fn load_link_config<P: AsRef<Path>>(path: P) -> Result<LinkConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_link_config_from_str(&contents)
}

/// Loads and validates a link configuration from a YAML string.
pub fn load_link_config_from_str(yaml: &str) -> Result<LinkConfig, ConfigError> {
    let config: LinkConfig =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
