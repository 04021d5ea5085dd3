//! Configuration for clusterun.
//!
//! Settings are merged from, in order of precedence:
//! - Command-line arguments (applied by the CLI layer)
//! - An explicit config file (`--config` / `CLUSTERUN_CONFIG`)
//! - `./clusterun.toml`
//! - `~/.clusterun.toml`
//! - Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default run settings.
    pub defaults: Defaults,

    /// SSH client settings.
    pub ssh: SshConfig,
}

/// Default run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Remote user.
    pub user: String,
    /// Remote ssh port.
    pub port: u16,
    /// Maximum number of nodes contacted in parallel.
    pub forks: usize,
    /// Per-node timeout in seconds, if any.
    pub timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            port: 22,
            forks: crate::coordinator::DEFAULT_FORKS,
            timeout: None,
        }
    }
}

/// SSH client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// The ssh executable to invoke.
    pub command: PathBuf,
    /// Extra options appended to every invocation.
    pub options: Option<String>,
    /// Identity file passed with `-i`.
    pub identity_file: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("ssh"),
            options: None,
            identity_file: None,
        }
    }
}

impl Config {
    /// Load configuration, preferring an explicit path when given.
    pub fn load(explicit: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&content)?)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("clusterun.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".clusterun.toml"));
        }
        paths
    }
}
