//! Configuration loading.
//!
//! Settings come from `armoury.toml`, looked up in this order:
//!
//! 1. an explicit path (the CLI's `--config`)
//! 2. `./armoury.toml`
//! 3. `<config dir>/armoury/armoury.toml` (e.g. `~/.config/armoury/armoury.toml`)
//!
//! When no file exists the defaults are used. Command-line flags and the
//! `ARMOURY_DATABASE_URL` environment variable are applied on top by the CLI.
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/armoury"
//! max_connections = 5
//! connect_attempts = 0   # 0 retries forever
//! connect_timeout_ms = 30000
//!
//! [render]
//! dialect = "postgres"
//! start_index = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{ArmouryError, ArmouryResult};

pub const CONFIG_FILE: &str = "armoury.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Connection attempts before giving up; 0 means never give up.
    pub connect_attempts: u32,
    /// How long one attempt may wait for a connection.
    pub connect_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            connect_attempts: 0,
            connect_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub dialect: Dialect,
    pub start_index: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            start_index: 1,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> ArmouryResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ArmouryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a file.
    pub fn from_path(path: &Path) -> ArmouryResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ArmouryError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load from the first configuration file found, or defaults.
    ///
    /// An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> ArmouryResult<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        match search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> ArmouryResult<()> {
        if self.render.start_index == 0 {
            return Err(ArmouryError::Config(
                "render.start_index must be at least 1".to_string(),
            ));
        }
        if self.database.connect_timeout_ms == 0 {
            return Err(ArmouryError::Config(
                "database.connect_timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ArmouryError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("armoury").join(CONFIG_FILE));
    }
    paths
}
