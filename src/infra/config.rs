// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::game::GameKind;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub games: GamesConfig,

    #[serde(default)]
    pub verifier: VerifierConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on every API call when set.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Entries shown by the leaderboard command.
    pub leaderboard_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8787,
            token: None,
            cors_origins: Vec::new(),
            leaderboard_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesConfig {
    pub default_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Per-kind overrides keyed by kind id (`chain`, `riddle`, ...).
    #[serde(default)]
    pub kinds: BTreeMap<String, KindOverride>,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 120,
            sweep_interval_secs: 30,
            kinds: BTreeMap::new(),
        }
    }
}

impl GamesConfig {
    pub fn override_for(&self, kind: GameKind) -> Option<&KindOverride> {
        self.kinds.get(kind.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindOverride {
    #[serde(default)]
    pub ttl_secs: Option<u64>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub rounds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Consult a language model for riddle/quiz answers the exact rules reject.
    pub enabled: bool,
    /// Candidate models in `provider/model` form, tried in order.
    #[serde(default)]
    pub models: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            models: vec!["openai/gpt-4.1-mini".into()],
            timeout_secs: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Extra question content (TOML). Defaults to ~/.majlis/catalog.toml when present.
    #[serde(default)]
    pub path: Option<String>,
}

impl CatalogConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(p) => Some(PathBuf::from(p)),
            None => {
                let default = paths::catalog_file_path();
                default.exists().then_some(default)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(paths::db_path)
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
