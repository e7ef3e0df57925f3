//! Error types for endpoint probing and message decoding

use thiserror::Error;

/// Why a single endpoint candidate was rejected
///
/// During `resolve` these are logged and the next candidate is tried;
/// only a direct `probe` hands them to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("empty endpoint url")]
    EmptyUrl,

    #[error("connect to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("{url} did not answer within {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("identity query against {url} failed: {reason}")]
    Query { url: String, reason: String },

    #[error("{url} serves chain {actual}, expected {expected}")]
    WrongNetwork {
        url: String,
        expected: u64,
        actual: u64,
    },
}

/// Errors raised while parsing an AMB message header
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("message truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("chain id length {0} exceeds 32 bytes")]
    ChainIdTooLong(u8),
}
