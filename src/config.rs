// src/config.rs
//
// Application configuration: CORS origins for the chart frontend, the
// divergence pair, and the market symbol. Loaded from an explicit path,
// the env override, or `config/terminal.toml`, falling back to a seeded
// default so a bare checkout still serves.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::DivergencePair;

const ENV_PATH: &str = "TERMINAL_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/terminal.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Exact allowed origins. Empty means a very permissive CORS layer
    /// (local development).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_pair")]
    pub divergence: DivergencePair,
    #[serde(default)]
    pub market: MarketConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Price-feed symbol for the overlay, e.g. "usdcad".
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

fn default_pair() -> DivergencePair {
    DivergencePair {
        left: "Fed".to_string(),
        right: "BoC".to_string(),
    }
}

fn default_symbol() -> String {
    "usdcad".to_string()
}

impl AppConfig {
    /// Built-in seed used when no config file is found.
    pub fn seed() -> Self {
        Self {
            cors_origins: Vec::new(),
            divergence: default_pair(),
            market: MarketConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load using env var + fallback:
    /// 1) $TERMINAL_CONFIG_PATH
    /// 2) config/terminal.toml
    /// 3) built-in seed
    pub fn load_default() -> Self {
        let candidate = std::env::var(ENV_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH));
        if candidate.exists() {
            match Self::load_from(&candidate) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(error = %e, path = %candidate.display(), "config unreadable, using seed");
                }
            }
        }
        Self::seed()
    }
}
