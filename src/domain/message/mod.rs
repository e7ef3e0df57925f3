//! Cross-chain message decoding
//!
//! Parses AMB messages relayed by the Omnibridge mediators: the packed
//! header, the mediator method selector, and the recipient argument.

mod header;
mod method;
mod recipient;

pub use header::{chain_id_lengths, MessageHeader, HEADER_PREFIX_LENGTH};
pub use method::BridgeMethod;
pub use recipient::{
    decode_call, decode_recipient, BridgeCall, ADDRESS_LENGTH, HEADER_LENGTH,
    METHOD_SIGNATURE_LENGTH, PADDED_LENGTH,
};
