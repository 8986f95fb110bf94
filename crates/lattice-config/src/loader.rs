//! Configuration Loader
//!
//! Handles loading `lattice.toml` and applying environment overrides.

use crate::settings::LatticeConfig;
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Merges configuration with the following precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Project config (./lattice.toml) - overrides defaults
/// 3. Environment variables (LATTICE_*) - overrides project
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Effective configuration after overrides
    pub config: LatticeConfig,

    /// Directory where lattice.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find lattice.toml. When none exists the
    /// defaults are used, still subject to environment overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<LoadedConfig> {
        let (project_root, config) = self.find_project_config(start_dir)?;
        let config = self.apply_env_overrides(config)?;

        Ok(LoadedConfig {
            config,
            project_root,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<LoadedConfig> {
        let config = LatticeConfig::load_from_file(config_path)?;
        let config = self.apply_env_overrides(config)?;

        Ok(LoadedConfig {
            config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, LatticeConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let config = LatticeConfig::load_from_file(&config_path)?;
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, LatticeConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Recognized variables: `LATTICE_MAX_DEPTH`, `LATTICE_INCLUDE_DEV`,
    /// `LATTICE_LIVE_BRANCHES` (comma separated).
    fn apply_env_overrides(&self, mut config: LatticeConfig) -> ConfigResult<LatticeConfig> {
        if let Ok(depth) = env::var("LATTICE_MAX_DEPTH") {
            config.resolver.max_depth =
                depth
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "LATTICE_MAX_DEPTH".to_string(),
                        reason: format!("'{}' is not a positive integer", depth),
                    })?;
        }

        if let Ok(include_dev) = env::var("LATTICE_INCLUDE_DEV") {
            config.resolver.include_dev_dependencies =
                matches!(include_dev.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        if let Ok(branches) = env::var("LATTICE_LIVE_BRANCHES") {
            config.resolver.live_branches = branches
                .split(',')
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect();
        }

        config.validate()?;
        Ok(config)
    }
}

impl LoadedConfig {
    /// Check if a lattice.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}
