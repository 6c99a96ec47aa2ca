//! # Canonical Object Codec
//!
//! Converts a [`Value`] to the MessagePack wire format shared by every
//! producer and consumer of structured objects in the Power ecosystem, and
//! back. For transport through JSON and other text-only channels the bytes
//! are rendered as lowercase hexadecimal: two characters per byte, no
//! separators, no `0x` prefix.
//!
//! ## Architecture
//!
//! ```text
//! value.rs  — Value, the tagged structured value, plus conversions
//! encode.rs — canonical encoder (narrowest markers, key-ordered maps)
//! decode.rs — strict decoder
//! marker.rs — wire-format marker bytes
//! error.rs  — CodecError
//! ```
//!
//! ## Guarantees
//!
//! - `decode(&encode(&v)?)? == v` for every value the encoder accepts.
//! - Encoding is deterministic: equal values produce identical hex.
//! - `decode("")` fails with [`CodecError::MalformedEncoding`]. The wire
//!   format has no encoding for "nothing", so an empty string can only be
//!   the result of a transport bug.
//!
//! All functions are pure and hold no shared state; they can be called
//! from any number of threads at once.

mod decode;
mod encode;
pub mod error;
mod marker;
pub mod value;

use tracing::{debug, trace};

pub use error::CodecError;
pub use value::Value;

/// Serializes `value` to its canonical byte form.
///
/// # Errors
///
/// [`CodecError::UnsupportedValueType`] for integers outside
/// `[-2^63, 2^64 - 1]`, non-finite floats, or nesting deeper than
/// [`crate::config::MAX_NESTING_DEPTH`].
pub fn to_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut encoder = encode::Encoder::new();
    encoder.write_value(value, 0).map_err(|e| {
        debug!(error = %e, "value rejected by encoder");
        e
    })?;
    let bytes = encoder.into_bytes();
    trace!(len = bytes.len(), "encoded value");
    Ok(bytes)
}

/// Deserializes one value from `bytes`. The value must span the whole slice.
pub fn from_bytes(bytes: &[u8]) -> Result<Value, CodecError> {
    decode::Decoder::new(bytes).read_document().map_err(|e| {
        debug!(error = %e, len = bytes.len(), "encoded value rejected");
        e
    })
}

/// Serializes `value` and renders the bytes as lowercase hex.
///
/// # Example
///
/// ```
/// use powertx_protocol::codec::{self, Value};
///
/// let v = Value::map([("a", Value::from(1u8)), ("b", Value::from("x"))]);
/// assert_eq!(codec::encode(&v).unwrap(), "82a16101a162a178");
/// ```
pub fn encode(value: &Value) -> Result<String, CodecError> {
    to_bytes(value).map(hex::encode)
}

/// Parses a hex string into bytes and deserializes them.
///
/// Upper-case digits are accepted; output from [`encode`] is always lower
/// case.
///
/// # Errors
///
/// [`CodecError::MalformedEncoding`] on odd length, non-hex characters,
/// an empty string, or bytes that are not a valid encoding.
pub fn decode(hex_str: &str) -> Result<Value, CodecError> {
    let bytes = hex::decode(hex_str).map_err(|e| {
        debug!(error = %e, len = hex_str.len(), "hex transport rejected");
        CodecError::malformed(format!("invalid hex: {}", e))
    })?;
    from_bytes(&bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
