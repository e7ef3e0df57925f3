//! Multi-endpoint RPC resolution and cross-chain message decoding.
//!
//! - [`EndpointResolver`] picks a reachable, network-verified RPC endpoint
//!   per chain from pinned, session-cached and default candidates.
//! - [`decode_recipient`] extracts the receiver of an Omnibridge message.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod resolver;
pub mod store;

pub use domain::chain::{ChainRegistry, ChainSpec};
pub use domain::message::{decode_call, decode_recipient, BridgeCall, BridgeMethod, MessageHeader};
pub use error::{MessageError, ProbeError};
pub use resolver::{CandidateSource, EndpointHandle, EndpointResolver};
pub use store::{KeyValueStore, MemoryStore, PinStore};
