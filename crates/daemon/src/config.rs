// Daemon and CLI configuration.
//
// Lookup: explicit `--config` path, then `./kbnav.toml`, then
// `<config_dir>/kbnav/config.toml`, then built-in defaults. `KBNAV_*`
// environment variables override whatever was loaded.

use std::env::VarError;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Span;

use crate::navigator::{NavigatorOptions, SearchStrategy};

pub const LOCAL_CONFIG_FILE: &str = "kbnav.toml";

/// Path to the per-user config file: `<config_dir>/kbnav/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kbnav").join("config.toml"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KbnavConfig {
    pub kb: KbConfig,
    pub http: HttpConfig,
    pub rpc: RpcConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KbConfig {
    /// Sandbox roots, in priority order.
    pub roots: Vec<PathBuf>,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self { roots: vec![PathBuf::from("./notes")] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    pub username: String,
    /// An empty password keeps the HTTP API from starting.
    pub password: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { addr: "127.0.0.1:8080".into(), username: "admin".into(), password: String::new() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// TCP listener for line-oriented JSON-RPC; `None` disables it.
    pub addr: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    #[default]
    Inline,
    Indexed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub strategy: StrategyName,
    pub index_path: PathBuf,
    pub reindex_on_start: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyName::Inline,
            index_path: PathBuf::from(".kbnav/index.db"),
            reindex_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::Text }
    }
}

impl KbnavConfig {
    /// Load using the lookup order, then apply environment overrides.
    ///
    /// An explicit path must load; implicit locations that are missing fall
    /// back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let mut candidates =
                    std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(user_config_path());
                match candidates.find(|path| path.is_file()) {
                    Some(path) => Self::load_from(&path)?,
                    None => Self::default(),
                }
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_env_fn(|key| std::env::var(key))
    }

    /// Testable override step that accepts an environment lookup function.
    fn with_env_fn<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        if let Ok(roots) = env("KBNAV_ROOTS") {
            self.kb.roots = std::env::split_paths(&roots).collect();
        }
        if let Ok(addr) = env("KBNAV_HTTP_ADDR") {
            self.http.addr = addr;
        }
        if let Ok(username) = env("KBNAV_USERNAME") {
            self.http.username = username;
        }
        if let Ok(password) = env("KBNAV_PASSWORD") {
            self.http.password = password;
        }
        if let Ok(addr) = env("KBNAV_RPC_ADDR") {
            self.rpc.addr = Some(addr).filter(|addr| !addr.trim().is_empty());
        }
        match env("KBNAV_SEARCH_STRATEGY").as_deref() {
            Ok("inline") => self.search.strategy = StrategyName::Inline,
            Ok("indexed") => self.search.strategy = StrategyName::Indexed,
            _ => {}
        }
        if let Ok(path) = env("KBNAV_INDEX_PATH") {
            self.search.index_path = PathBuf::from(path);
        }
        if let Ok(level) = env("KBNAV_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    pub fn navigator_options(&self, span: Span) -> NavigatorOptions {
        let search = match self.search.strategy {
            StrategyName::Inline => SearchStrategy::Inline,
            StrategyName::Indexed => {
                SearchStrategy::Indexed { index_path: self.search.index_path.clone() }
            }
        };
        NavigatorOptions { roots: self.kb.roots.clone(), search, span }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config `{}`: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
}
