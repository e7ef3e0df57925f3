use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::chain::{ChainRegistry, ChainSpec};
use crate::resolver::DEFAULT_PROBE_TIMEOUT;

/// Prefix of the per-chain env override, e.g. `OMNILINK_RPC_URLS_100`
pub const RPC_URLS_ENV_PREFIX: &str = "OMNILINK_RPC_URLS_";

#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub rpc: Vec<String>,
    pub ens_address: Option<String>,
    pub pin_key: Option<String>,
    pub explorer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub probe_timeout_ms: Option<u64>,

    #[serde(default)]
    pub chains: Vec<ChainEntry>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse config")
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    /// Built-in chains overlaid with config entries, then env overrides
    pub fn chain_registry(&self) -> ChainRegistry {
        let mut registry = ChainRegistry::with_defaults();
        for entry in &self.chains {
            let spec = match registry.get(entry.chain_id) {
                Some(existing) => entry.apply(existing.clone()),
                None => entry.apply(ChainSpec::unknown(entry.chain_id)),
            };
            registry.insert(spec);
        }

        let ids: Vec<u64> = registry.iter().map(|spec| spec.chain_id).collect();
        for chain_id in ids {
            let Ok(value) = std::env::var(format!("{RPC_URLS_ENV_PREFIX}{chain_id}")) else {
                continue;
            };
            if let Some(spec) = registry.get_mut(chain_id) {
                spec.rpc_urls = split_urls(&value);
            }
        }
        registry
    }
}

impl ChainEntry {
    fn apply(&self, mut spec: ChainSpec) -> ChainSpec {
        if let Some(name) = non_empty(&self.name) {
            spec.name = name;
        }
        if let Some(label) = non_empty(&self.label) {
            spec.label = label;
        }
        if !self.rpc.is_empty() {
            spec.rpc_urls = self.rpc.iter().flat_map(|urls| split_urls(urls)).collect();
        }
        if let Some(raw) = non_empty(&self.ens_address) {
            match raw.parse::<Address>() {
                Ok(registry) => spec.ens_address = Some(registry),
                Err(err) => tracing::warn!(
                    chain_id = self.chain_id,
                    value = %raw,
                    error = %err,
                    "ignoring invalid ens_address"
                ),
            }
        }
        if let Some(pin_key) = non_empty(&self.pin_key) {
            spec.pin_key = Some(pin_key);
        }
        if let Some(explorer) = non_empty(&self.explorer) {
            spec.explorer = Some(explorer);
        }
        spec
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match Config::parse(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "using default config");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("OMNILINK_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("omnilink").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("omnilink").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "omnilink", "omnilink")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("omnilink"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("omnilink"));
    }
    directories::ProjectDirs::from("io", "omnilink", "omnilink")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn pins_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("pins.sqlite3"))
}

/// Space-separated URL list, as accepted in env overrides
fn split_urls(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
