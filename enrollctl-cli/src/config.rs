//! Layered configuration for `enrollctl serve`
//!
//! Lowest to highest precedence:
//! 1. built-in defaults
//! 2. TOML file (`--config <path>`, else `~/.enrollctl/config.toml` if present)
//! 3. environment (`DATABASE_URL`, `ENROLLCTL_BIND`), after `.env` is loaded
//! 4. command-line flags
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//! cors_permissive = false
//!
//! [database]
//! url = "postgres://localhost/enrollctl"
//! max_connections = 10
//! acquire_timeout_secs = 5
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use enrollctl_server::{PoolSettings, ServerConfig};
use serde::Deserialize;

/// Environment variable holding the database URL
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable holding the bind address
pub const BIND_VAR: &str = "ENROLLCTL_BIND";

/// `[server]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
}

/// `[database]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

/// Contents of a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

impl FileConfig {
    /// Default config file path: ~/.enrollctl/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".enrollctl/config.toml")
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid TOML")
    }
}

/// One configuration layer; unset fields fall through to lower layers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub bind: Option<SocketAddr>,
    pub cors_permissive: Option<bool>,
    pub database_url: Option<String>,
    pub max_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

impl From<FileConfig> for Layer {
    fn from(file: FileConfig) -> Self {
        Self {
            bind: file.server.bind,
            cors_permissive: file.server.cors_permissive,
            database_url: file.database.url,
            max_connections: file.database.max_connections,
            acquire_timeout_secs: file.database.acquire_timeout_secs,
        }
    }
}

impl Layer {
    /// Layer read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Layer read through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup(BIND_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<SocketAddr>()
                    .with_context(|| format!("{BIND_VAR} is not a socket address: {v}"))
            })
            .transpose()?;

        Ok(Self {
            bind,
            database_url: lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty()),
            ..Self::default()
        })
    }

    /// Put `higher` on top of `self`.
    pub fn overlay(self, higher: Layer) -> Layer {
        Layer {
            bind: higher.bind.or(self.bind),
            cors_permissive: higher.cors_permissive.or(self.cors_permissive),
            database_url: higher.database_url.or(self.database_url),
            max_connections: higher.max_connections.or(self.max_connections),
            acquire_timeout_secs: higher.acquire_timeout_secs.or(self.acquire_timeout_secs),
        }
    }

    /// Fill remaining gaps with defaults.
    pub fn resolve(self) -> Result<ResolvedConfig> {
        let Some(database_url) = self.database_url else {
            bail!(
                "DATABASE_URL not set. Set via --database-url, the {DATABASE_URL_VAR} env var, \
                 .env, or [database] url in {}",
                FileConfig::default_path().display()
            );
        };

        let server_defaults = ServerConfig::default();
        let pool_defaults = PoolSettings::default();

        let max_connections = self.max_connections.unwrap_or(pool_defaults.max_connections);
        if max_connections == 0 {
            bail!("max_connections must be at least 1");
        }

        Ok(ResolvedConfig {
            server: ServerConfig {
                bind_addr: self.bind.unwrap_or(server_defaults.bind_addr),
                cors_permissive: self.cors_permissive.unwrap_or(server_defaults.cors_permissive),
            },
            database_url,
            pool: PoolSettings {
                max_connections,
                acquire_timeout: self
                    .acquire_timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(pool_defaults.acquire_timeout),
            },
        })
    }
}

/// Final settings for the server
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub pool: PoolSettings,
}
