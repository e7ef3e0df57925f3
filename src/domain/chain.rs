//! Chain table - per-network labels, default RPC candidates and name registries

use std::collections::BTreeMap;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Prefix of the session-store key holding the last healthy URL of a chain
pub const SESSION_KEY_PREFIX: &str = "HEALTHY-RPC-URL-";

/// Canonical ENS registry, deployed at the same address on mainnet and its testnets
pub const CANONICAL_ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// Static description of one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub chain_id: u64,
    /// Full display name (e.g. "Gnosis Chain")
    pub name: String,
    /// Short label, used to derive the session cache key
    pub label: String,
    /// Default RPC candidates in priority order
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    /// Name-resolution registry for chains lacking a canonical one
    #[serde(default)]
    pub ens_address: Option<Address>,
    /// Key of the persistent user override
    #[serde(default)]
    pub pin_key: Option<String>,
    #[serde(default)]
    pub explorer: Option<String>,
}

impl ChainSpec {
    pub fn new(chain_id: u64, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            label: label.into(),
            rpc_urls: Vec::new(),
            ens_address: None,
            pin_key: None,
            explorer: None,
        }
    }

    /// Placeholder spec for a chain id missing from the table
    pub fn unknown(chain_id: u64) -> Self {
        Self::new(chain_id, format!("Chain {chain_id}"), format!("chain-{chain_id}"))
    }

    pub fn with_rpc_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rpc_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ens_address(mut self, registry: Address) -> Self {
        self.ens_address = Some(registry);
        self
    }

    pub fn with_pin_key(mut self, key: impl Into<String>) -> Self {
        self.pin_key = Some(key.into());
        self
    }

    pub fn with_explorer(mut self, explorer: impl Into<String>) -> Self {
        self.explorer = Some(explorer.into());
        self
    }

    /// Session-store key, e.g. `HEALTHY-RPC-URL-GNOSIS CHAIN`
    pub fn session_key(&self) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, self.label.to_uppercase())
    }

    /// Pin-store key, e.g. `xdai-rpc-url`
    pub fn pin_key(&self) -> String {
        self.pin_key
            .clone()
            .unwrap_or_else(|| format!("chain-{}-rpc-url", self.chain_id))
    }
}

/// Registry of chain specs indexed by chain id
#[derive(Debug, Default, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainSpec>,
}

impl ChainRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the bridge networks
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in default_chains() {
            registry.insert(spec);
        }
        registry
    }

    /// Insert a chain, replacing any previous spec for the same id
    pub fn insert(&mut self, spec: ChainSpec) -> Option<ChainSpec> {
        self.chains.insert(spec.chain_id, spec)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainSpec> {
        self.chains.get(&chain_id)
    }

    pub fn get_mut(&mut self, chain_id: u64) -> Option<&mut ChainSpec> {
        self.chains.get_mut(&chain_id)
    }

    /// Spec for `chain_id`, or a placeholder when the id is unknown
    pub fn spec_or_unknown(&self, chain_id: u64) -> ChainSpec {
        self.get(chain_id)
            .cloned()
            .unwrap_or_else(|| ChainSpec::unknown(chain_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainSpec> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn default_chains() -> Vec<ChainSpec> {
    vec![
        ChainSpec::new(1, "ETH Mainnet", "Mainnet")
            .with_rpc_urls(["https://cloudflare-eth.com", "https://rpc.ankr.com/eth"])
            .with_ens_address(CANONICAL_ENS_REGISTRY)
            .with_pin_key("mainnet-rpc-url")
            .with_explorer("https://blockscout.com/eth/mainnet"),
        ChainSpec::new(4, "Rinkeby Testnet", "Rinkeby")
            .with_ens_address(CANONICAL_ENS_REGISTRY)
            .with_pin_key("rinkeby-rpc-url")
            .with_explorer("https://rinkeby.etherscan.io"),
        ChainSpec::new(42, "Kovan Testnet", "Kovan")
            .with_pin_key("kovan-rpc-url")
            .with_explorer("https://blockscout.com/eth/kovan"),
        ChainSpec::new(56, "Binance Smart Chain", "BSC")
            .with_rpc_urls(["https://bsc-dataseed.binance.org", "https://bsc-dataseed1.defibit.io"])
            .with_pin_key("bsc-rpc-url")
            .with_explorer("https://bscscan.com"),
        ChainSpec::new(77, "Sokol Testnet", "Sokol")
            .with_rpc_urls(["https://sokol.poa.network"])
            .with_pin_key("sokol-rpc-url")
            .with_explorer("https://blockscout.com/poa/sokol"),
        ChainSpec::new(99, "POA Network", "POA")
            .with_rpc_urls(["https://core.poa.network"])
            .with_pin_key("poa-rpc-url")
            .with_explorer("https://blockscout.com/poa/core"),
        ChainSpec::new(100, "Gnosis Chain", "Gnosis Chain")
            .with_rpc_urls(["https://rpc.gnosischain.com", "https://xdai-archive.blockscout.com"])
            .with_pin_key("xdai-rpc-url")
            .with_explorer("https://blockscout.com/xdai/mainnet"),
        ChainSpec::new(10000, "smartBCH", "smartBCH")
            .with_rpc_urls(["https://smartbch.greyh.at", "https://smartbch.fountainhead.cash/mainnet"])
            .with_ens_address(address!("Cfb86556760d03942EBf1ba88a9870e67D77b627"))
            .with_pin_key("smartbch-rpc-url")
            .with_explorer("https://sonar.cash"),
        ChainSpec::new(10001, "smartBCH Amber Testnet", "smartBCH Amber")
            .with_rpc_urls(["https://moeing.tech:9545"])
            .with_ens_address(address!("32f1FBE59D771bdB7FB247FE97A635f50659202b"))
            .with_pin_key("amber-rpc-url")
            .with_explorer("https://testnet.sonar.cash"),
    ]
}
