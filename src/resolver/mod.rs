//! Endpoint resolution with tiered fallback and health probing
//!
//! For a chain id the resolver tries, in order:
//! 1. the URL pinned by the user (persistent store),
//! 2. the last URL found healthy in this session (session store),
//! 3. every configured default, probed concurrently; the first success in
//!    list order wins.
//!
//! A probe connects and asks the node for its chain id within a bounded
//! timeout. Probe failures are logged and never surface to the caller.

mod handle;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::stream::{FuturesOrdered, StreamExt};
use tokio::sync::RwLock;
use tokio::time::timeout;

use crate::domain::chain::{ChainRegistry, ChainSpec};
use crate::error::ProbeError;
use crate::infrastructure::ethereum::{AlloyConnector, ChainClient, Connector};
use crate::store::{KeyValueStore, MemoryStore};

pub use handle::{CandidateSource, EndpointHandle, HandleSummary};

/// Upper bound for a single probe, connection included
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

type ConnectionKey = (String, u64);

/// Resolves a chain id to a verified endpoint
pub struct EndpointResolver {
    registry: ChainRegistry,
    pins: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    connector: Arc<dyn Connector>,
    probe_timeout: Duration,
    /// Memoized connections per (url, chain id); fill-once, duplicates harmless
    connections: RwLock<HashMap<ConnectionKey, Arc<dyn ChainClient>>>,
}

impl EndpointResolver {
    pub fn builder(registry: ChainRegistry) -> EndpointResolverBuilder {
        EndpointResolverBuilder::new(registry)
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Resolve `chain_id` to a healthy endpoint, or `None` if every tier fails
    pub async fn resolve(&self, chain_id: u64) -> Option<EndpointHandle> {
        let chain = self.registry.spec_or_unknown(chain_id);
        let session_key = chain.session_key();

        let pinned = read_store(self.pins.as_ref(), &chain.pin_key());
        let cached = read_store(self.session.as_ref(), &session_key);

        let mut handle = None;
        if let Some(url) = pinned {
            handle = self.probe_logged(&url, &chain, CandidateSource::Pinned).await;
        }
        if handle.is_none() {
            if let Some(url) = cached {
                handle = self.probe_logged(&url, &chain, CandidateSource::Session).await;
            }
        }
        if handle.is_none() {
            handle = self.probe_defaults(&chain).await;
        }

        match handle {
            Some(handle) => {
                if let Err(err) = self.session.set(&session_key, handle.url()) {
                    tracing::warn!(chain_id, error = %err, "failed to cache healthy rpc url");
                }
                tracing::info!(
                    chain_id,
                    url = handle.url(),
                    source = %handle.source(),
                    "resolved rpc endpoint"
                );
                Some(handle)
            }
            None => {
                tracing::warn!(chain_id, label = %chain.label, "no healthy rpc endpoint");
                None
            }
        }
    }

    /// Probe a single URL for `chain_id`, bypassing every cache tier
    pub async fn probe(&self, url: &str, chain_id: u64) -> Result<EndpointHandle, ProbeError> {
        let chain = self.registry.spec_or_unknown(chain_id);
        self.probe_candidate(url, &chain, CandidateSource::Direct).await
    }

    /// Pin `url` as the preferred endpoint for `chain_id`
    pub fn pin(&self, chain_id: u64, url: &str) -> Result<()> {
        let chain = self.registry.spec_or_unknown(chain_id);
        self.pins.set(&chain.pin_key(), url.trim())
    }

    pub fn unpin(&self, chain_id: u64) -> Result<()> {
        let chain = self.registry.spec_or_unknown(chain_id);
        self.pins.remove(&chain.pin_key())
    }

    pub fn pinned(&self, chain_id: u64) -> Option<String> {
        let chain = self.registry.spec_or_unknown(chain_id);
        read_store(self.pins.as_ref(), &chain.pin_key())
    }

    /// Last URL recorded healthy for `chain_id` in this session
    pub fn session_url(&self, chain_id: u64) -> Option<String> {
        let chain = self.registry.spec_or_unknown(chain_id);
        read_store(self.session.as_ref(), &chain.session_key())
    }

    /// Number of memoized connections
    pub async fn cached_connections(&self) -> usize {
        self.connections.read().await.len()
    }

    async fn probe_defaults(&self, chain: &ChainSpec) -> Option<EndpointHandle> {
        // FuturesOrdered polls every probe concurrently but yields in list
        // order, so the first Ok is the earliest healthy candidate.
        let mut probes: FuturesOrdered<_> = chain
            .rpc_urls
            .iter()
            .enumerate()
            .map(|(index, url)| {
                self.probe_logged(url, chain, CandidateSource::Default { index })
            })
            .collect();

        while let Some(result) = probes.next().await {
            if result.is_some() {
                return result;
            }
        }
        None
    }

    async fn probe_logged(
        &self,
        url: &str,
        chain: &ChainSpec,
        source: CandidateSource,
    ) -> Option<EndpointHandle> {
        match self.probe_candidate(url, chain, source).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::debug!(chain_id = chain.chain_id, %source, error = %err, "probe failed");
                None
            }
        }
    }

    async fn probe_candidate(
        &self,
        url: &str,
        chain: &ChainSpec,
        source: CandidateSource,
    ) -> Result<EndpointHandle, ProbeError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ProbeError::EmptyUrl);
        }

        let client = timeout(self.probe_timeout, self.verified_client(url, chain.chain_id))
            .await
            .map_err(|_| ProbeError::Timeout {
                url: url.to_string(),
                timeout_ms: self.probe_timeout.as_millis() as u64,
            })??;

        Ok(EndpointHandle::new(url, chain, source, client))
    }

    async fn verified_client(
        &self,
        url: &str,
        chain_id: u64,
    ) -> Result<Arc<dyn ChainClient>, ProbeError> {
        let client = self.connection(url, chain_id).await?;
        let actual = client.chain_id().await.map_err(|err| ProbeError::Query {
            url: url.to_string(),
            reason: format!("{err:#}"),
        })?;
        if actual != chain_id {
            return Err(ProbeError::WrongNetwork {
                url: url.to_string(),
                expected: chain_id,
                actual,
            });
        }
        Ok(client)
    }

    async fn connection(&self, url: &str, chain_id: u64) -> Result<Arc<dyn ChainClient>, ProbeError> {
        let key = (url.to_string(), chain_id);
        if let Some(client) = self.connections.read().await.get(&key) {
            return Ok(client.clone());
        }

        let client = self
            .connector
            .connect(url)
            .await
            .map_err(|err| ProbeError::Connect {
                url: url.to_string(),
                reason: format!("{err:#}"),
            })?;

        let mut connections = self.connections.write().await;
        Ok(connections.entry(key).or_insert(client).clone())
    }
}

fn read_store(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|url| !url.trim().is_empty()),
        Err(err) => {
            tracing::warn!(key, error = %err, "store read failed");
            None
        }
    }
}

/// Builder for [`EndpointResolver`]
pub struct EndpointResolverBuilder {
    registry: ChainRegistry,
    pins: Option<Arc<dyn KeyValueStore>>,
    session: Option<Arc<dyn KeyValueStore>>,
    connector: Option<Arc<dyn Connector>>,
    probe_timeout: Duration,
}

impl EndpointResolverBuilder {
    fn new(registry: ChainRegistry) -> Self {
        Self {
            registry,
            pins: None,
            session: None,
            connector: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn pin_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.pins = Some(store);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session = Some(store);
        self
    }

    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Missing stores default to in-memory ones, the connector to Alloy
    pub fn build(self) -> EndpointResolver {
        EndpointResolver {
            registry: self.registry,
            pins: self.pins.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            session: self.session.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            connector: self.connector.unwrap_or_else(|| Arc::new(AlloyConnector)),
            probe_timeout: self.probe_timeout,
            connections: RwLock::new(HashMap::new()),
        }
    }
}
