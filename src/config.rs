//! Registry configuration using Figment.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. The user configuration file (`<config dir>/modreg/modreg.toml`)
//! 3. `modreg.toml` in the working directory, or the file named by `MODREG_CONFIG`
//! 4. Environment variables prefixed with `MODREG_`
//!
//! # Environment Variable Overrides
//!
//! Nested keys are separated by a double underscore:
//!
//! ```text
//! MODREG_LIBRARY_MARKER=.plugin
//! MODREG_SEARCH__EXECUTABLE_DIRS=false
//! MODREG_SEARCH__EXTRA_DIRS=["/opt/modules"]
//! ```
//!
//! The module search path itself is read from the variable named by
//! `search.path_variable` (default `MODREG_MODULE_PATH`), a list of
//! directories joined with the platform path separator.
//!
//! # Example
//!
//! ```no_run
//! use modreg::config::RegistryConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = RegistryConfig::load()?;
//!     println!("Library marker: {}", config.library_marker);
//!     println!("Search variable: {}", config.search.path_variable);
//!     Ok(())
//! }
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the search-path environment variable.
pub const DEFAULT_PATH_VARIABLE: &str = "MODREG_MODULE_PATH";

/// Default marker segment preceding the shared-library suffix.
pub const DEFAULT_LIBRARY_MARKER: &str = ".module";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VARIABLE: &str = "MODREG_CONFIG";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "MODREG_";

const CONFIG_FILE_NAME: &str = "modreg.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or parsed.
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),
    /// Values parsed but break a constraint.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::LoadError(Box::new(err))
    }
}

/// Top-level registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Where discovery looks for module libraries
    #[serde(default)]
    pub search: SearchConfig,
    /// Marker placed before the shared-library suffix in module file names
    /// (`.module` matches `sample.module.so`)
    #[serde(default = "default_library_marker")]
    pub library_marker: String,
}

/// Discovery search locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Probe the executable's directory, the registry library's directory,
    /// and the adjacent directories of both
    #[serde(default = "default_enabled")]
    pub executable_dirs: bool,
    /// Names of directories next to the executable's directory to probe
    #[serde(default = "default_adjacent_dirs")]
    pub adjacent_dirs: Vec<String>,
    /// Environment variable holding additional search directories
    #[serde(default = "default_path_variable")]
    pub path_variable: String,
    /// Additional directories, probed last
    #[serde(default)]
    pub extra_dirs: Vec<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            executable_dirs: default_enabled(),
            adjacent_dirs: default_adjacent_dirs(),
            path_variable: default_path_variable(),
            extra_dirs: Vec::new(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            library_marker: default_library_marker(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from all default sources.
    pub fn load() -> Result<Self, ConfigError> {
        let local = std::env::var_os(CONFIG_PATH_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let mut figment = Figment::from(Serialized::defaults(RegistryConfig::default()));
        if let Some(user) = user_config_path() {
            figment = figment.merge(Toml::file(user));
        }
        figment = figment
            .merge(Toml::file(local))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(figment)
    }

    /// Load configuration from a specific file, with environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let figment = Figment::from(Serialized::defaults(RegistryConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(figment)
    }

    /// Extract and validate configuration from a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: RegistryConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration semantics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library_marker.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "library_marker must not be empty".to_string(),
            ));
        }

        if self.search.path_variable.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "search.path_variable must not be empty".to_string(),
            ));
        }

        if let Some(name) = self
            .search
            .adjacent_dirs
            .iter()
            .find(|name| name.is_empty() || name.contains(['/', '\\']))
        {
            return Err(ConfigError::ValidationError(format!(
                "adjacent directory '{name}' must be a plain directory name"
            )));
        }

        Ok(())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("modreg").join(CONFIG_FILE_NAME))
}

// Default value functions
fn default_enabled() -> bool {
    true
}

fn default_adjacent_dirs() -> Vec<String> {
    ["module", "modules", "lib"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_path_variable() -> String {
    DEFAULT_PATH_VARIABLE.to_string()
}

fn default_library_marker() -> String {
    DEFAULT_LIBRARY_MARKER.to_string()
}
