use anyhow::{Context, Result};
use pillar_search::ParamsGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub quick: QuickConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Base URL of the web application
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Search API path under the endpoint
    #[serde(default = "default_search_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuickConfig {
    /// Multi-search API path under the endpoint
    #[serde(default = "default_multisearch_path")]
    pub api_path: String,

    /// Named quick-search scopes, e.g. `cloud` or `project`
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ScopeConfig {
    /// UI URL of the advanced-search page for this scope
    pub ui_url: String,

    /// Sub-searches fanned out by one quick-search call
    #[serde(default)]
    pub groups: Vec<ParamsGroup>,
}

fn default_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_search_path() -> String {
    "/api/newsearch".to_string()
}

fn default_multisearch_path() -> String {
    "/api/newsearch/multisearch".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            path: default_search_path(),
        }
    }
}

impl Default for QuickConfig {
    fn default() -> Self {
        Self {
            api_path: default_multisearch_path(),
            scopes: BTreeMap::new(),
        }
    }
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let expanded: PathBuf = shellexpand::tilde(&path.to_string_lossy())
        .into_owned()
        .into();
    let content = fs::read_to_string(&expanded)
        .context(format!("Failed to read config file: {:?}", expanded))?;

    let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

    info!(path = ?expanded, "loaded config");
    Ok(config)
}
