//! Resolver settings (`lattice.toml`)

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on how deep the dependency walk may go.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Branch names treated as installable when enumerating remote versions.
pub const DEFAULT_LIVE_BRANCHES: [&str; 3] = ["main", "master", "develop"];

/// Top-level contents of `lattice.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LatticeConfig {
    /// Dependency resolution settings
    #[serde(default)]
    pub resolver: ResolverSettings,
}

/// `[resolver]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ResolverSettings {
    /// Maximum recursion depth before resolution is aborted
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Whether non-required (dev/optional) dependencies are followed
    #[serde(default)]
    pub include_dev_dependencies: bool,

    /// Branch names that count as installable versions
    #[serde(default = "default_live_branches")]
    pub live_branches: Vec<String>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_live_branches() -> Vec<String> {
    DEFAULT_LIVE_BRANCHES.iter().map(|b| b.to_string()).collect()
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            include_dev_dependencies: false,
            live_branches: default_live_branches(),
        }
    }
}

impl LatticeConfig {
    /// Parse configuration from a TOML string without validating it
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load and validate configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config = Self::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.resolver.validate()
    }
}

impl ResolverSettings {
    /// Validate resolver settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.max-depth".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(blank) = self.live_branches.iter().find(|b| b.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "resolver.live-branches".to_string(),
                reason: format!("branch name '{}' is blank", blank),
            });
        }

        Ok(())
    }
}
