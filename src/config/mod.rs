//! Site configuration management for `curo.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                               |
//! |-------------|-------------------------------------------------------|
//! | `[content]` | Content/asset/registry paths and the output directory |
//! | `[routes]`  | Static routes and supported locales                   |
//! | `[serve]`   | HTTP server (port, interface, public dir)             |
//! | `[validate]`| Which validation passes are enabled                   |

mod error;
mod handle;
mod section;

pub use error::ConfigError;
pub use handle::{cfg, init_config};
pub use section::{ContentConfig, RoutesConfig, ServeConfig, ValidateConfig};

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing curo.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Content/asset/registry paths
    #[serde(default)]
    pub content: ContentConfig,

    /// Static routes and locales
    #[serde(default)]
    pub routes: RoutesConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Validation settings
    #[serde(default)]
    pub validate: ValidateConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cli: None,
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            content: ContentConfig::default(),
            routes: RoutesConfig::default(),
            serve: ServeConfig::default(),
            validate: ValidateConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory. A missing config file is not an
    /// error - defaults apply and the root is cwd - because the tool should
    /// run inside checkouts that have not adopted a config yet.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current working directory")?;

        let (config_path, mut config) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                (path, config)
            }
            None => (cwd.join(&cli.config), Self::default()),
        };

        config.root = crate::utils::normalize_path(
            config_path.parent().unwrap_or(cwd.as_path()),
        );
        config.config_path = config_path;
        config.cli = Some(cli);

        config.validate_paths()?;
        Ok(config)
    }

    /// Parse a config file from disk.
    fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Reject obviously broken path settings before any command runs.
    fn validate_paths(&self) -> Result<()> {
        if self.content.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "content.dir must not be empty".to_string(),
            )
            .into());
        }
        if self.content.dir.is_absolute() || self.content.assets.is_absolute() {
            return Err(ConfigError::Validation(
                "content paths must be relative to the project root".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Join a path to the project root.
    #[inline]
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute content directory (`marketing-content/` by default).
    pub fn content_dir(&self) -> PathBuf {
        self.root_join(&self.content.dir)
    }

    /// Absolute physical assets directory (`attached_assets/` by default).
    pub fn assets_dir(&self) -> PathBuf {
        self.root_join(&self.content.assets)
    }

    /// Absolute path of the image registry JSON.
    pub fn registry_path(&self) -> PathBuf {
        self.root_join(&self.content.registry)
    }

    /// Absolute path of the schema-org registry JSON.
    pub fn schema_registry_path(&self) -> PathBuf {
        self.root_join(&self.content.schema_registry)
    }

    /// Absolute path of the serialized redirect artifact.
    pub fn redirects_artifact(&self) -> PathBuf {
        self.root_join(&self.content.output).join("redirects.json")
    }

    /// Absolute public directory served at `/`.
    pub fn public_dir(&self) -> PathBuf {
        self.root_join(&self.serve.public)
    }
}

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    if config_name.is_absolute() && config_name.exists() {
        return Some(config_name.to_path_buf());
    }

    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Parse a config string for tests (root left empty).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    toml::from_str(content).expect("test config should parse")
}
