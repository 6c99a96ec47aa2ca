//! Error types for the canonical object codec.

use thiserror::Error;

/// Errors produced while encoding or decoding structured values.
///
/// Neither variant is recovered inside the codec: the caller always sees the
/// failure, and a decode never returns a value that misrepresents its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The hex string or the byte sequence behind it is not a valid encoding
    /// (odd length, non-hex character, truncation, reserved tag, length
    /// mismatch, trailing bytes, duplicate map key, invalid UTF-8).
    #[error("malformed encoding: {reason}")]
    MalformedEncoding { reason: String },

    /// The value holds something the wire format cannot carry, or the wire
    /// holds something [`super::Value`] cannot represent.
    #[error("unsupported value type: {reason}")]
    UnsupportedValueType { reason: String },
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEncoding {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedValueType {
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`CodecError::MalformedEncoding`].
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEncoding { .. })
    }
}
