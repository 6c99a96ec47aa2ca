//! Errors raised when transaction data crosses a trust boundary.

use num_bigint::BigInt;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors from parsing, building, or serializing transaction data.
///
/// Each variant names the offending field or code so the caller can report
/// it without re-parsing the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A kind code on the wire matches no declared [`super::TxKind`] or
    /// [`super::TxKindByName`] member.
    #[error("unknown transaction kind: {code}")]
    UnknownTransactionKind { code: BigInt },

    /// A kind name matches no declared member.
    #[error("unknown transaction kind name: {name:?}")]
    UnknownKindName { name: String },

    /// A purpose code on the wire matches no declared [`super::TxPurpose`].
    #[error("unknown purpose code: {code}")]
    UnknownPurposeCode { code: BigInt },

    /// A tag byte inside a signature entry matches no declared
    /// [`super::TxTag`].
    #[error("unknown tag byte: {code:#04x}")]
    UnknownTag { code: u8 },

    /// A required field is absent.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A field is present but has the wrong shape.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// A generic transaction carries neither purposes nor a contract call.
    #[error("generic transaction carries neither purposes nor a contract call")]
    EmptyPurposes,

    /// The underlying object codec failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl TransactionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
