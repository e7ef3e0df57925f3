//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain clients and the connector seam used by the resolver
//! - Name-registry lookups over `eth_call`

pub mod ethereum;
