//! Application support for the UE binary

pub mod config_loader;

pub use config_loader::{load_link_config, load_link_config_from_str, ConfigError};
