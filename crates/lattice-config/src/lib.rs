//! Lattice Configuration
//!
//! Loads resolver settings from `lattice.toml` and the environment.
//!
//! # Configuration Hierarchy
//!
//! Settings are merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`lattice.toml`, found by walking up from a directory)
//! 3. Environment variables (`LATTICE_*`)
//!
//! # Example
//!
//! ```no_run
//! use lattice_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("max depth: {}", config.config.resolver.max_depth);
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// File name searched for by [`ConfigLoader`].
pub const CONFIG_FILE_NAME: &str = "lattice.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{ConfigLoader, LoadedConfig};
pub use settings::{LatticeConfig, ResolverSettings};
