//! Signed transaction envelope.
//!
//! Signing happens outside this crate: the caller hands
//! [`SignedTx::signing_payload`] to its signer and attaches the result as a
//! [`SignatureEntry`]. This module only fixes how those pieces are laid out
//! on the wire.
//!
//! A signature entry is a run of TLV fields, each `[tag, len, bytes…]` with
//! a one-byte length, tagged with [`TxTag`] markers. The envelope itself is
//! a structured value:
//!
//! ```text
//! { "body": binary(canonical body bytes), "sig": [binary(entry)…], "ver": 2 }
//! ```

use std::collections::BTreeMap;

use num_traits::ToPrimitive;
use tracing::debug;

use super::body::{bytes, integer, reject_unknown_keys, TxBody};
use super::error::TransactionError;
use super::types::TxTag;
use crate::codec::{self, Value};
use crate::config::{ENVELOPE_VERSION, MAX_TLV_VALUE_LENGTH};

pub const FIELD_BODY: &str = "body";
pub const FIELD_SIGNATURES: &str = "sig";
pub const FIELD_VERSION: &str = "ver";

const FIELD_PUBLIC_KEY: &str = "public_key";
const FIELD_SIGNATURE: &str = "signature";

// ---------------------------------------------------------------------------
// SignatureEntry
// ---------------------------------------------------------------------------

/// One signer's public key and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignatureEntry {
    pub fn new(public_key: Vec<u8>, signature: Vec<u8>) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// Serializes the entry as TLV bytes: public key first, signature last.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut buf = Vec::with_capacity(4 + self.public_key.len() + self.signature.len());
        push_tlv(&mut buf, TxTag::PublicKey, FIELD_PUBLIC_KEY, &self.public_key)?;
        push_tlv(&mut buf, TxTag::Signature, FIELD_SIGNATURE, &self.signature)?;
        Ok(buf)
    }

    /// Parses TLV bytes. Fields may appear in any order, each exactly once.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TransactionError> {
        let mut public_key = None;
        let mut signature = None;
        let mut pos = 0;

        while pos < data.len() {
            let tag = TxTag::from_code(data[pos])?;
            let len = *data.get(pos + 1).ok_or_else(|| {
                TransactionError::invalid(FIELD_SIGNATURES, "truncated TLV header")
            })? as usize;
            let start = pos + 2;
            let value = data.get(start..start + len).ok_or_else(|| {
                TransactionError::invalid(
                    FIELD_SIGNATURES,
                    format!("TLV value of {} bytes truncated at offset {}", len, start),
                )
            })?;

            let slot = match tag {
                TxTag::PublicKey => &mut public_key,
                TxTag::Signature => &mut signature,
            };
            if slot.replace(value.to_vec()).is_some() {
                return Err(TransactionError::invalid(
                    FIELD_SIGNATURES,
                    format!("duplicate {:?} field", tag),
                ));
            }
            pos = start + len;
        }

        Ok(Self {
            public_key: public_key.ok_or(TransactionError::MissingField {
                field: FIELD_PUBLIC_KEY,
            })?,
            signature: signature.ok_or(TransactionError::MissingField {
                field: FIELD_SIGNATURE,
            })?,
        })
    }
}

fn push_tlv(
    buf: &mut Vec<u8>,
    tag: TxTag,
    field: &'static str,
    value: &[u8],
) -> Result<(), TransactionError> {
    if value.is_empty() || value.len() > MAX_TLV_VALUE_LENGTH {
        return Err(TransactionError::invalid(
            field,
            format!(
                "length must be 1..={} bytes, got {}",
                MAX_TLV_VALUE_LENGTH,
                value.len()
            ),
        ));
    }
    buf.push(tag.code());
    buf.push(value.len() as u8);
    buf.extend_from_slice(value);
    Ok(())
}

// ---------------------------------------------------------------------------
// SignedTx
// ---------------------------------------------------------------------------

/// A transaction body together with the signatures collected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    body: TxBody,
    signatures: Vec<SignatureEntry>,
}

impl SignedTx {
    pub fn new(body: TxBody) -> Self {
        Self {
            body,
            signatures: Vec::new(),
        }
    }

    /// Returns a new envelope with `entry` appended.
    pub fn with_signature(mut self, entry: SignatureEntry) -> Self {
        self.signatures.push(entry);
        self
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn signatures(&self) -> &[SignatureEntry] {
        &self.signatures
    }

    /// The bytes an external signer must sign: the canonical body bytes.
    pub fn signing_payload(&self) -> Result<Vec<u8>, TransactionError> {
        self.body.to_bytes()
    }

    pub fn to_value(&self) -> Result<Value, TransactionError> {
        let sigs = self
            .signatures
            .iter()
            .map(|s| s.to_bytes().map(Value::Binary))
            .collect::<Result<Vec<_>, _>>()?;

        let mut m = BTreeMap::new();
        m.insert(FIELD_BODY.to_string(), Value::Binary(self.body.to_bytes()?));
        m.insert(FIELD_SIGNATURES.to_string(), Value::Array(sigs));
        m.insert(FIELD_VERSION.to_string(), Value::from(ENVELOPE_VERSION));
        Ok(Value::Map(m))
    }

    pub fn from_value(value: &Value) -> Result<Self, TransactionError> {
        let m = value.as_map().ok_or_else(|| {
            TransactionError::invalid(
                "envelope",
                format!("expected map, found {}", value.type_name()),
            )
        })?;
        reject_unknown_keys("envelope", m, &[FIELD_BODY, FIELD_SIGNATURES, FIELD_VERSION])?;

        let version = m.get(FIELD_VERSION).ok_or(TransactionError::MissingField {
            field: FIELD_VERSION,
        })?;
        let version = integer(FIELD_VERSION, version)?;
        if version.to_u8() != Some(ENVELOPE_VERSION) {
            return Err(TransactionError::invalid(
                FIELD_VERSION,
                format!("unsupported envelope version {}", version),
            ));
        }

        let body = m.get(FIELD_BODY).ok_or(TransactionError::MissingField {
            field: FIELD_BODY,
        })?;
        let body = TxBody::from_bytes(bytes(FIELD_BODY, body)?)?;

        let signatures = match m.get(FIELD_SIGNATURES) {
            None | Some(Value::Nil) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| bytes(FIELD_SIGNATURES, item).and_then(SignatureEntry::from_bytes))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(TransactionError::invalid(
                    FIELD_SIGNATURES,
                    format!("expected array, found {}", other.type_name()),
                ))
            }
        };

        Ok(Self { body, signatures })
    }

    pub fn to_hex(&self) -> Result<String, TransactionError> {
        Ok(codec::encode(&self.to_value()?)?)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let value = codec::decode(hex_str)?;
        Self::from_value(&value).map_err(|e| {
            debug!(error = %e, "signed envelope rejected");
            e
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
