//! Recipient extraction from encoded bridge messages

use alloy_primitives::Address;
use serde::Serialize;

use super::header::{chain_id_lengths, HEADER_PREFIX_LENGTH};
use super::method::BridgeMethod;

/// Header length assuming 1-byte source and destination chain ids.
///
/// Only valid while both chain ids stay below 256; longer ids shift the
/// selector and this constant misparses the message.
pub const HEADER_LENGTH: usize = HEADER_PREFIX_LENGTH + 1 + 1;
pub const METHOD_SIGNATURE_LENGTH: usize = 4;
pub const PADDED_LENGTH: usize = 32;
pub const ADDRESS_LENGTH: usize = 20;

/// A recognised mediator call and its receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeCall {
    pub method: BridgeMethod,
    pub recipient: Address,
}

/// Extract the cross-chain recipient of an encoded bridge message.
///
/// Returns `None` for truncated input, unknown selectors, or an argument
/// block too short to hold the receiver slot.
pub fn decode_recipient(payload: &[u8]) -> Option<Address> {
    decode_call(payload).map(|call| call.recipient)
}

/// Identify the mediator method and extract its recipient in one pass
pub fn decode_call(payload: &[u8]) -> Option<BridgeCall> {
    let args_start = HEADER_LENGTH + METHOD_SIGNATURE_LENGTH;
    if payload.len() < args_start {
        return None;
    }

    let mut selector = [0u8; METHOD_SIGNATURE_LENGTH];
    selector.copy_from_slice(&payload[HEADER_LENGTH..args_start]);
    let method = BridgeMethod::from_selector(selector)?;

    if let Some((source, destination)) = chain_id_lengths(payload) {
        if source != 1 || destination != 1 {
            tracing::warn!(
                source_len = source,
                destination_len = destination,
                method = %method,
                "message header declares multi-byte chain ids, fixed-offset recipient may be wrong"
            );
        }
    }

    let data = &payload[args_start..];
    // strip the 12 bytes of left padding from the receiver slot
    let end = method.recipient_slot() * PADDED_LENGTH;
    let slot = data.get(end - ADDRESS_LENGTH..end)?;

    Some(BridgeCall {
        method,
        recipient: Address::from_slice(slot),
    })
}
