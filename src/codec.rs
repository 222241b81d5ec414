//! Binary encoding of protocol messages.
//!
//! Messages use the protobuf wire format: a key (field number and wire type) per
//! value, varints for integers, booleans and enumerations, length-delimited runs
//! for strings and nested messages, fixed-width little-endian for floats.
//!
//! # Decoding rules
//!
//! - Fields may arrive in any order; encoding emits them by ascending field number.
//! - Unknown field numbers are skipped.
//! - Several slots of one oneof group may appear; the last one seen wins.
//! - Enumeration values outside the known range are kept as their raw number.
//! - Truncated input and nested lengths that overrun the buffer are rejected
//!   with a [`DecodeError`].
use prost::Message;
use thiserror::Error;

/// Failure to decode a message, tagged with the message type being decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to decode {message}: {source}")]
pub struct DecodeError {
    pub message: &'static str,
    #[source]
    pub source: prost::DecodeError,
}

/// Encodes a message. Never fails for an in-memory message.
pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

pub fn decode<M: Message + Default>(bytes: &[u8]) -> Result<M, DecodeError> {
    M::decode(bytes).map_err(|source| DecodeError {
        message: short_type_name::<M>(),
        source,
    })
}

fn short_type_name<M>() -> &'static str {
    let name = std::any::type_name::<M>();
    name.rsplit("::").next().unwrap_or(name)
}
