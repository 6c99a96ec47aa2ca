//! # Protocol Configuration & Constants
//!
//! Every fixed number the codec and the transaction model agree on lives
//! here. These values are part of the wire contract shared with the signing
//! SDK and the network: changing one after release breaks every client that
//! already serialized data with the old value.

// ---------------------------------------------------------------------------
// Codec Limits
// ---------------------------------------------------------------------------

/// Maximum nesting depth of arrays and maps accepted by the codec, in either
/// direction. Transaction bodies nest three levels deep at most, so 64 leaves
/// plenty of room for ancillary payloads while keeping recursion bounded on
/// hostile input.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Smallest integer representable on the wire (`int64` family).
pub const MIN_WIRE_INTEGER: i64 = i64::MIN;

/// Largest integer representable on the wire (`uint64` family).
pub const MAX_WIRE_INTEGER: u64 = u64::MAX;

// ---------------------------------------------------------------------------
// Signed Envelope
// ---------------------------------------------------------------------------

/// Envelope format version written into the `ver` field of a signed
/// transaction. Anything else is rejected on decode.
pub const ENVELOPE_VERSION: u8 = 2;

/// Maximum length of a single TLV value inside a signature entry. The length
/// prefix is one byte wide.
pub const MAX_TLV_VALUE_LENGTH: usize = u8::MAX as usize;
