//! Configuration management for Opsrun.
//!
//! Handles loading configuration from TOML files. A project-level
//! `.opsrun.toml` wins over the user configuration; defaults apply when
//! neither exists.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runbook discovery settings
    pub runbooks: RunbookConfig,
}

/// Runbook discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunbookConfig {
    /// Directories searched for runbooks, relative to the working directory
    /// unless absolute; `~` expands to the home directory
    pub dirs: Vec<String>,

    /// File extensions recognized as runbooks
    pub extensions: Vec<String>,
}

impl Default for RunbookConfig {
    fn default() -> Self {
        Self {
            dirs: vec![".opsrun/runbooks".to_string(), "runbooks".to_string()],
            extensions: vec![
                "sh".to_string(),
                "sql".to_string(),
                "js".to_string(),
                "runbook".to_string(),
            ],
        }
    }
}

impl RunbookConfig {
    /// The search directories with `~` expanded, absolute paths kept, and
    /// relative paths joined to `root`.
    #[must_use]
    pub fn expanded_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| {
                let expanded = shellexpand::tilde(dir);
                let path = PathBuf::from(expanded.as_ref());
                if path.is_absolute() {
                    path
                } else {
                    root.join(path)
                }
            })
            .collect()
    }
}

impl Config {
    /// Load the effective configuration.
    ///
    /// Tries the project file first, then the user file; unreadable or
    /// invalid files fall back to defaults with a warning rather than
    /// aborting, so a stray config cannot brick the CLI.
    #[must_use]
    pub fn load() -> Self {
        for path in [Some(Self::project_path()), Self::user_path()].into_iter().flatten() {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    tracing::debug!(path = ?path, "Loaded configuration");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Ignoring invalid config");
                }
            }
        }
        Self::default()
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Project-level config path, relative to the working directory.
    #[must_use]
    pub fn project_path() -> PathBuf {
        PathBuf::from(".opsrun.toml")
    }

    /// User-level config path (`~/.config/opsrun/config.toml` on Linux).
    #[must_use]
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("opsrun").join("config.toml"))
    }
}
