//! Ethereum infrastructure - Alloy clients and name-registry lookups

pub mod ens;
mod provider;

pub use provider::{
    create_client, AlloyClient, AlloyConnector, ChainClient, Connector, ProviderConfig,
};
