//! Domain models
//!
//! This layer is independent of transports and storage:
//! - `chain`: the chain table the resolver reads candidates from
//! - `message`: AMB message header and recipient decoding

pub mod chain;
pub mod message;
