//! Chain client abstraction and Alloy implementations

use std::sync::Arc;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};

/// Transport selected from an endpoint URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Pick the transport from the URL scheme; anything but ws/wss is HTTP
    pub fn from_url(url: &str) -> Self {
        let lower = url.trim().to_ascii_lowercase();
        if lower.starts_with("ws://") || lower.starts_with("wss://") {
            ProviderConfig::WebSocket(url.trim().to_string())
        } else {
            ProviderConfig::Http(url.trim().to_string())
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }

    /// Check if this is a WebSocket endpoint
    pub fn is_websocket(&self) -> bool {
        matches!(self, ProviderConfig::WebSocket(_))
    }
}

/// Read-only chain operations available on a resolved endpoint
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Network identity (`eth_chainId`)
    async fn chain_id(&self) -> Result<u64>;

    /// Get the current block number
    async fn block_number(&self) -> Result<u64>;

    /// Get account balance
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Execute a call (eth_call)
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based client that stores the concrete provider for each transport
pub enum AlloyClient {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create a client from configuration
///
/// HTTP construction does no I/O; WebSocket construction performs the handshake.
pub async fn create_client(config: ProviderConfig) -> Result<Arc<dyn ChainClient>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Arc::new(AlloyClient::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Arc::new(AlloyClient::WebSocket {
                provider,
                endpoint: url,
            }))
        }
    }
}

macro_rules! impl_provider_method {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyClient::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyClient::WebSocket { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl ChainClient for AlloyClient {
    async fn chain_id(&self) -> Result<u64> {
        Ok(impl_provider_method!(self, get_chain_id)?)
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(impl_provider_method!(self, get_block_number)?)
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(impl_provider_method!(self, get_balance, address)?)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        Ok(impl_provider_method!(self, call, request)?)
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyClient::Http { endpoint, .. } => endpoint.clone(),
            AlloyClient::WebSocket { endpoint, .. } => endpoint.clone(),
        }
    }
}

/// Builds chain clients for candidate URLs
///
/// The resolver only talks to endpoints through this seam, so tests can
/// substitute scripted clients.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainClient>>;
}

/// Connector backed by Alloy providers
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyConnector;

#[async_trait::async_trait]
impl Connector for AlloyConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn ChainClient>> {
        let config = ProviderConfig::from_url(url);
        tracing::trace!(
            endpoint = %config.display(),
            websocket = config.is_websocket(),
            "connecting"
        );
        create_client(config).await
    }
}
