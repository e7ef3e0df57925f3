//! Name-registry lookups (ENS-compatible registries)
//!
//! Some chains have no canonical registry, so the registry address always
//! comes from the chain table rather than from the node.

use alloy::primitives::{keccak256, Address, B256};
use alloy::rpc::types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use anyhow::{Context, Result};

use super::ChainClient;

sol! {
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface IEnsResolver {
        function addr(bytes32 node) external view returns (address);
        function name(bytes32 node) external view returns (string);
    }
}

/// EIP-137 namehash of a dotted name
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    let normalized = name.trim().to_lowercase();
    for label in normalized.rsplit('.') {
        if label.is_empty() {
            continue;
        }
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

/// Node of `<address>.addr.reverse`
pub fn reverse_node(address: Address) -> B256 {
    namehash(&format!("{}.addr.reverse", hex::encode(address.as_slice())))
}

/// Forward resolution: name -> address
pub async fn resolve_name(
    client: &dyn ChainClient,
    registry: Address,
    name: &str,
) -> Result<Option<Address>> {
    let node = namehash(name);
    let Some(resolver) = resolver_of(client, registry, node).await? else {
        return Ok(None);
    };

    let data = eth_call(client, resolver, IEnsResolver::addrCall { node }.abi_encode()).await?;
    let address = IEnsResolver::addrCall::abi_decode_returns(&data)
        .context("Failed to decode addr() result")?;
    Ok((!address.is_zero()).then_some(address))
}

/// Reverse resolution: address -> primary name
///
/// The name is only returned if it resolves back to `address`.
pub async fn lookup_address(
    client: &dyn ChainClient,
    registry: Address,
    address: Address,
) -> Result<Option<String>> {
    let node = reverse_node(address);
    let Some(resolver) = resolver_of(client, registry, node).await? else {
        return Ok(None);
    };

    let data = eth_call(client, resolver, IEnsResolver::nameCall { node }.abi_encode()).await?;
    let name = IEnsResolver::nameCall::abi_decode_returns(&data)
        .context("Failed to decode name() result")?;
    if name.is_empty() {
        return Ok(None);
    }

    match resolve_name(client, registry, &name).await? {
        Some(forward) if forward == address => Ok(Some(name)),
        _ => {
            tracing::debug!(%address, %name, "reverse record does not resolve back");
            Ok(None)
        }
    }
}

async fn resolver_of(
    client: &dyn ChainClient,
    registry: Address,
    node: B256,
) -> Result<Option<Address>> {
    let data = eth_call(client, registry, IEnsRegistry::resolverCall { node }.abi_encode()).await?;
    let resolver = IEnsRegistry::resolverCall::abi_decode_returns(&data)
        .context("Failed to decode resolver() result")?;
    Ok((!resolver.is_zero()).then_some(resolver))
}

async fn eth_call(client: &dyn ChainClient, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>> {
    let request = TransactionRequest::default().to(to).input(calldata.into());
    Ok(client.call(request).await?.to_vec())
}
