//! AMB message header
//!
//! Layout of the packed prefix that precedes the mediator call:
//!
//! ```text
//! offset  0 : 32 bytes :: bytes32 - message id
//! offset 32 : 20 bytes :: address - sender
//! offset 52 : 20 bytes :: address - executor
//! offset 72 :  4 bytes :: uint32  - gas limit
//! offset 76 :  1 byte  :: uint8   - source chain id length (X)
//! offset 77 :  1 byte  :: uint8   - destination chain id length (Y)
//! offset 78 :  1 byte  :: uint8   - data type
//! offset 79 :  X bytes :: source chain id
//! offset 79 + X : Y bytes :: destination chain id
//! ```

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

use crate::error::MessageError;

/// Size of the fixed part of the header, before the chain ids
pub const HEADER_PREFIX_LENGTH: usize = 79;

const SOURCE_CHAIN_ID_LENGTH_OFFSET: usize = 76;
const DESTINATION_CHAIN_ID_LENGTH_OFFSET: usize = 77;
const DATA_TYPE_OFFSET: usize = 78;

/// Decoded AMB message header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageHeader {
    pub message_id: B256,
    pub sender: Address,
    pub executor: Address,
    pub gas_limit: u32,
    pub data_type: u8,
    pub source_chain_id_len: u8,
    pub destination_chain_id_len: u8,
    pub source_chain_id: U256,
    pub destination_chain_id: U256,
}

impl MessageHeader {
    /// Parse the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self, MessageError> {
        if data.len() < HEADER_PREFIX_LENGTH {
            return Err(MessageError::Truncated {
                needed: HEADER_PREFIX_LENGTH,
                actual: data.len(),
            });
        }
        let source_len = data[SOURCE_CHAIN_ID_LENGTH_OFFSET];
        let destination_len = data[DESTINATION_CHAIN_ID_LENGTH_OFFSET];
        for len in [source_len, destination_len] {
            if len > 32 {
                return Err(MessageError::ChainIdTooLong(len));
            }
        }

        let source_end = HEADER_PREFIX_LENGTH + source_len as usize;
        let destination_end = source_end + destination_len as usize;
        if data.len() < destination_end {
            return Err(MessageError::Truncated {
                needed: destination_end,
                actual: data.len(),
            });
        }

        let mut gas_limit = [0u8; 4];
        gas_limit.copy_from_slice(&data[72..76]);

        Ok(Self {
            message_id: B256::from_slice(&data[..32]),
            sender: Address::from_slice(&data[32..52]),
            executor: Address::from_slice(&data[52..72]),
            gas_limit: u32::from_be_bytes(gas_limit),
            data_type: data[DATA_TYPE_OFFSET],
            source_chain_id_len: source_len,
            destination_chain_id_len: destination_len,
            source_chain_id: U256::from_be_slice(&data[HEADER_PREFIX_LENGTH..source_end]),
            destination_chain_id: U256::from_be_slice(&data[source_end..destination_end]),
        })
    }

    /// Total header length, i.e. the offset of the method selector
    pub fn byte_len(&self) -> usize {
        HEADER_PREFIX_LENGTH
            + self.source_chain_id_len as usize
            + self.destination_chain_id_len as usize
    }

    /// Whether both chain ids are encoded in a single byte
    pub fn is_compact(&self) -> bool {
        self.source_chain_id_len == 1 && self.destination_chain_id_len == 1
    }
}

/// Read the two chain-id length bytes without decoding the rest
pub fn chain_id_lengths(data: &[u8]) -> Option<(u8, u8)> {
    Some((
        *data.get(SOURCE_CHAIN_ID_LENGTH_OFFSET)?,
        *data.get(DESTINATION_CHAIN_ID_LENGTH_OFFSET)?,
    ))
}
