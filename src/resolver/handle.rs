//! Resolved endpoint handle

use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::Result;
use serde::Serialize;

use crate::domain::chain::ChainSpec;
use crate::infrastructure::ethereum::{ens, ChainClient};

/// Tier a winning candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// User override from the persistent store
    Pinned,
    /// Last healthy URL cached for this session
    Session,
    /// Configured default, with its position in the list
    Default { index: usize },
    /// Probed directly by the caller
    Direct,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::Pinned => f.write_str("pinned"),
            CandidateSource::Session => f.write_str("session"),
            CandidateSource::Default { index } => write!(f, "default #{index}"),
            CandidateSource::Direct => f.write_str("direct"),
        }
    }
}

/// A verified, connected endpoint for one chain
///
/// Cloning is cheap; the underlying connection is shared.
#[derive(Clone)]
pub struct EndpointHandle {
    url: String,
    chain_id: u64,
    chain_name: String,
    ens_address: Option<Address>,
    source: CandidateSource,
    client: Arc<dyn ChainClient>,
}

impl EndpointHandle {
    pub(crate) fn new(
        url: &str,
        chain: &ChainSpec,
        source: CandidateSource,
        client: Arc<dyn ChainClient>,
    ) -> Self {
        Self {
            url: url.to_string(),
            chain_id: chain.chain_id,
            chain_name: chain.name.clone(),
            ens_address: chain.ens_address,
            source,
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// Name-resolution registry attached to this connection, if any
    pub fn ens_address(&self) -> Option<Address> {
        self.ens_address
    }

    pub fn source(&self) -> CandidateSource {
        self.source
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub async fn block_number(&self) -> Result<u64> {
        self.client.block_number().await
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.client.get_balance(address).await
    }

    /// Primary name of `address`; `None` when the chain has no registry
    pub async fn lookup_address(&self, address: Address) -> Result<Option<String>> {
        let Some(registry) = self.ens_address else {
            tracing::debug!(chain_id = self.chain_id, "no name registry configured");
            return Ok(None);
        };
        ens::lookup_address(self.client.as_ref(), registry, address).await
    }

    /// Address behind `name`; `None` when the chain has no registry
    pub async fn resolve_name(&self, name: &str) -> Result<Option<Address>> {
        let Some(registry) = self.ens_address else {
            tracing::debug!(chain_id = self.chain_id, "no name registry configured");
            return Ok(None);
        };
        ens::resolve_name(self.client.as_ref(), registry, name).await
    }
}

impl fmt::Debug for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointHandle")
            .field("url", &self.url)
            .field("chain_id", &self.chain_id)
            .field("chain_name", &self.chain_name)
            .field("ens_address", &self.ens_address)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Serializable summary of a handle, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct HandleSummary {
    pub url: String,
    pub chain_id: u64,
    pub chain_name: String,
    pub ens_address: Option<Address>,
    pub source: CandidateSource,
}

impl From<&EndpointHandle> for HandleSummary {
    fn from(handle: &EndpointHandle) -> Self {
        Self {
            url: handle.url.clone(),
            chain_id: handle.chain_id,
            chain_name: handle.chain_name.clone(),
            ens_address: handle.ens_address,
            source: handle.source,
        }
    }
}
