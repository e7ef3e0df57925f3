//! Scripted chain clients for exercising the resolver without a node

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{anyhow, bail, Result};

use omnilink::infrastructure::ethereum::{ChainClient, Connector};
use omnilink::{ChainRegistry, ChainSpec};

/// How a scripted endpoint behaves
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answers `eth_chainId` after `delay`
    Healthy { chain_id: u64, delay: Duration },
    /// Refuses the connection
    Unreachable,
    /// Connects, then fails every query
    Erroring,
}

impl Behavior {
    pub fn healthy(chain_id: u64) -> Self {
        Behavior::Healthy {
            chain_id,
            delay: Duration::ZERO,
        }
    }

    pub fn slow(chain_id: u64, delay: Duration) -> Self {
        Behavior::Healthy { chain_id, delay }
    }
}

struct ScriptedClient {
    url: String,
    behavior: Behavior,
    queries: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ChainClient for ScriptedClient {
    async fn chain_id(&self) -> Result<u64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Healthy { chain_id, delay } => {
                tokio::time::sleep(*delay).await;
                Ok(*chain_id)
            }
            _ => bail!("{} is not answering", self.url),
        }
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(42)
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        Ok(U256::ZERO)
    }

    async fn call(&self, _request: TransactionRequest) -> Result<Bytes> {
        Ok(Bytes::new())
    }

    fn endpoint_name(&self) -> String {
        self.url.clone()
    }
}

/// Connector handing out scripted clients and counting what it was asked
#[derive(Default)]
pub struct ScriptedConnector {
    behaviors: Mutex<HashMap<String, Behavior>>,
    connects: Mutex<HashMap<String, usize>>,
    queries: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, url: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(url.to_string(), behavior);
    }

    /// Times `url` was connected to
    pub fn connects(&self, url: &str) -> usize {
        self.connects.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_connects(&self) -> usize {
        self.connects.lock().unwrap().values().sum()
    }

    /// `eth_chainId` calls across every client
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainClient>> {
        *self
            .connects
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Behavior::Unreachable);
        if matches!(behavior, Behavior::Unreachable) {
            return Err(anyhow!("connection refused: {url}"));
        }
        Ok(Arc::new(ScriptedClient {
            url: url.to_string(),
            behavior,
            queries: self.queries.clone(),
        }))
    }
}

/// Registry with a single chain `chain_id` and the given defaults
pub fn registry_with(chain_id: u64, label: &str, urls: &[&str]) -> ChainRegistry {
    let mut registry = ChainRegistry::new();
    registry.insert(
        ChainSpec::new(chain_id, format!("Test {label}"), label).with_rpc_urls(urls.iter().copied()),
    );
    registry
}
