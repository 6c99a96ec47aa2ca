//! The unsigned transaction body.
//!
//! A [`TxBody`] is built once, right before a signing request, and handed
//! over exactly once. Its fields are private: there is no way to change a
//! body in place, only to build a new one.
//!
//! # Structured Form
//!
//! On the wire a body is a map keyed by single-letter field names:
//!
//! ```text
//! k   kind code                       integer     required
//! t   timestamp / ordering value      integer     required
//! f   sender address                  binary      required
//! to  recipient address               binary      required
//! s   sequence number                 integer     required
//! p   purposes [[code, asset, amt]]   array       required
//! e   {sponsor: binary, msg: string}  map         optional
//! c   [method, args]                  array       optional
//! pa  opaque auxiliary bytes          binary      optional
//! ```
//!
//! Optional fields are omitted when absent. On parse, `nil` is accepted in
//! place of an omitted optional field; unknown keys are rejected.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::TransactionError;
use super::types::{TxKind, TxPurpose};
use crate::codec::{self, Value};

pub const FIELD_KIND: &str = "k";
pub const FIELD_TIMESTAMP: &str = "t";
pub const FIELD_FROM: &str = "f";
pub const FIELD_TO: &str = "to";
pub const FIELD_SEQ: &str = "s";
pub const FIELD_PURPOSES: &str = "p";
pub const FIELD_EXTENSION: &str = "e";
pub const FIELD_CALL: &str = "c";
pub const FIELD_PA: &str = "pa";

pub const EXT_SPONSOR: &str = "sponsor";
pub const EXT_MESSAGE: &str = "msg";

// ---------------------------------------------------------------------------
// Purpose
// ---------------------------------------------------------------------------

/// One value-movement line item: `[code, asset, amount]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purpose {
    pub purpose: TxPurpose,
    /// Asset ticker, e.g. `"SK"`.
    pub asset: String,
    /// Exact integer amount in the asset's smallest unit.
    pub amount: BigInt,
}

impl Purpose {
    pub fn new(purpose: TxPurpose, asset: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        Self {
            purpose,
            asset: asset.into(),
            amount: amount.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.purpose.code()),
            Value::from(self.asset.as_str()),
            Value::Integer(self.amount.clone()),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self, TransactionError> {
        let items = value.as_array().ok_or_else(|| {
            TransactionError::invalid(
                FIELD_PURPOSES,
                format!("entry must be an array, found {}", value.type_name()),
            )
        })?;
        let [code, asset, amount] = items else {
            return Err(TransactionError::invalid(
                FIELD_PURPOSES,
                format!("entry must have 3 elements, found {}", items.len()),
            ));
        };

        let code = integer(FIELD_PURPOSES, code)?;
        let purpose = match code.to_u8() {
            Some(c) => TxPurpose::from_code(c)?,
            None => {
                return Err(TransactionError::UnknownPurposeCode { code: code.clone() });
            }
        };

        Ok(Self {
            purpose,
            asset: string(FIELD_PURPOSES, asset)?.to_string(),
            amount: integer(FIELD_PURPOSES, amount)?.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Extension & contract call
// ---------------------------------------------------------------------------

/// Optional extension block (`e`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxExtension {
    /// Address of the account paying sponsored fees and gas.
    pub sponsor: Option<Vec<u8>>,
    /// Free-form message attached to the transaction.
    pub msg: Option<String>,
}

impl TxExtension {
    pub fn is_empty(&self) -> bool {
        self.sponsor.is_none() && self.msg.is_none()
    }

    pub fn to_value(&self) -> Value {
        let mut m = BTreeMap::new();
        if let Some(sponsor) = &self.sponsor {
            m.insert(EXT_SPONSOR.to_string(), Value::Binary(sponsor.clone()));
        }
        if let Some(msg) = &self.msg {
            m.insert(EXT_MESSAGE.to_string(), Value::String(msg.clone()));
        }
        Value::Map(m)
    }

    pub fn from_value(value: &Value) -> Result<Self, TransactionError> {
        let m = value.as_map().ok_or_else(|| {
            TransactionError::invalid(
                FIELD_EXTENSION,
                format!("expected map, found {}", value.type_name()),
            )
        })?;
        reject_unknown_keys(FIELD_EXTENSION, m, &[EXT_SPONSOR, EXT_MESSAGE])?;

        Ok(Self {
            sponsor: optional(m, EXT_SPONSOR)
                .map(|v| bytes(FIELD_EXTENSION, v).map(<[u8]>::to_vec))
                .transpose()?,
            msg: optional(m, EXT_MESSAGE)
                .map(|v| string(FIELD_EXTENSION, v).map(str::to_string))
                .transpose()?,
        })
    }
}

/// Optional contract-call payload (`c`): `[method, args]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Method name or selector.
    pub method: String,
    /// ABI-encoded arguments.
    pub args: Vec<u8>,
}

impl ContractCall {
    pub fn new(method: impl Into<String>, args: Vec<u8>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.method.as_str()),
            Value::Binary(self.args.clone()),
        ])
    }

    pub fn from_value(value: &Value) -> Result<Self, TransactionError> {
        match value.as_array() {
            Some([method, args]) => Ok(Self {
                method: string(FIELD_CALL, method)?.to_string(),
                args: bytes(FIELD_CALL, args)?.to_vec(),
            }),
            _ => Err(TransactionError::invalid(
                FIELD_CALL,
                "expected [method, args]",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// TxBody
// ---------------------------------------------------------------------------

/// An unsigned transaction.
///
/// Address lengths and amount ranges are not checked here; the signing and
/// network layers own those rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxBody {
    kind: TxKind,
    timestamp: BigInt,
    from: Vec<u8>,
    to: Vec<u8>,
    seq: BigInt,
    purposes: Vec<Purpose>,
    extension: Option<TxExtension>,
    call: Option<ContractCall>,
    pa: Option<Vec<u8>>,
}

impl TxBody {
    /// Creates a body from its required fields. Optional fields are attached
    /// with the `with_*` methods, each of which returns a new body.
    pub fn new(
        kind: TxKind,
        timestamp: impl Into<BigInt>,
        from: Vec<u8>,
        to: Vec<u8>,
        seq: impl Into<BigInt>,
        purposes: Vec<Purpose>,
    ) -> Self {
        Self {
            kind,
            timestamp: timestamp.into(),
            from,
            to,
            seq: seq.into(),
            purposes,
            extension: None,
            call: None,
            pa: None,
        }
    }

    /// Attaches an extension block. An empty block is dropped.
    pub fn with_extension(self, extension: TxExtension) -> Self {
        Self {
            extension: (!extension.is_empty()).then_some(extension),
            ..self
        }
    }

    pub fn with_contract_call(self, call: ContractCall) -> Self {
        Self {
            call: Some(call),
            ..self
        }
    }

    pub fn with_pa(self, pa: Vec<u8>) -> Self {
        Self {
            pa: Some(pa),
            ..self
        }
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn timestamp(&self) -> &BigInt {
        &self.timestamp
    }

    pub fn sender(&self) -> &[u8] {
        &self.from
    }

    pub fn recipient(&self) -> &[u8] {
        &self.to
    }

    pub fn seq(&self) -> &BigInt {
        &self.seq
    }

    /// Purposes in application order.
    pub fn purposes(&self) -> &[Purpose] {
        &self.purposes
    }

    pub fn extension(&self) -> Option<&TxExtension> {
        self.extension.as_ref()
    }

    pub fn contract_call(&self) -> Option<&ContractCall> {
        self.call.as_ref()
    }

    pub fn pa(&self) -> Option<&[u8]> {
        self.pa.as_deref()
    }

    /// Returns `true` if any purpose transfers a non-zero amount.
    pub fn moves_value(&self) -> bool {
        self.purposes
            .iter()
            .any(|p| p.purpose == TxPurpose::Transfer && !p.amount.is_zero())
    }

    /// Sums the amounts of every purpose of the given type and asset.
    pub fn total_for(&self, purpose: TxPurpose, asset: &str) -> BigInt {
        self.purposes
            .iter()
            .filter(|p| p.purpose == purpose && p.asset == asset)
            .map(|p| &p.amount)
            .sum()
    }

    /// The purpose list alone, in application order.
    pub fn purposes_to_value(&self) -> Value {
        Value::Array(self.purposes.iter().map(Purpose::to_value).collect())
    }

    /// The structured form of the body.
    pub fn to_value(&self) -> Value {
        let mut m = BTreeMap::new();
        m.insert(FIELD_KIND.to_string(), Value::from(self.kind.code()));
        m.insert(
            FIELD_TIMESTAMP.to_string(),
            Value::Integer(self.timestamp.clone()),
        );
        m.insert(FIELD_FROM.to_string(), Value::Binary(self.from.clone()));
        m.insert(FIELD_TO.to_string(), Value::Binary(self.to.clone()));
        m.insert(FIELD_SEQ.to_string(), Value::Integer(self.seq.clone()));
        m.insert(FIELD_PURPOSES.to_string(), self.purposes_to_value());
        if let Some(e) = &self.extension {
            m.insert(FIELD_EXTENSION.to_string(), e.to_value());
        }
        if let Some(c) = &self.call {
            m.insert(FIELD_CALL.to_string(), c.to_value());
        }
        if let Some(pa) = &self.pa {
            m.insert(FIELD_PA.to_string(), Value::Binary(pa.clone()));
        }
        Value::Map(m)
    }

    /// Parses the structured form, rejecting unknown kind and purpose codes.
    pub fn from_value(value: &Value) -> Result<Self, TransactionError> {
        let m = value.as_map().ok_or_else(|| {
            TransactionError::invalid("body", format!("expected map, found {}", value.type_name()))
        })?;
        reject_unknown_keys(
            "body",
            m,
            &[
                FIELD_KIND,
                FIELD_TIMESTAMP,
                FIELD_FROM,
                FIELD_TO,
                FIELD_SEQ,
                FIELD_PURPOSES,
                FIELD_EXTENSION,
                FIELD_CALL,
                FIELD_PA,
            ],
        )?;

        let code = integer(FIELD_KIND, required(m, FIELD_KIND)?)?;
        let kind = match code.to_u8() {
            Some(c) => TxKind::from_code(c)?,
            None => {
                return Err(TransactionError::UnknownTransactionKind { code: code.clone() });
            }
        };

        let purposes = required(m, FIELD_PURPOSES)?
            .as_array()
            .ok_or_else(|| TransactionError::invalid(FIELD_PURPOSES, "expected array"))?
            .iter()
            .map(Purpose::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            timestamp: integer(FIELD_TIMESTAMP, required(m, FIELD_TIMESTAMP)?)?.clone(),
            from: bytes(FIELD_FROM, required(m, FIELD_FROM)?)?.to_vec(),
            to: bytes(FIELD_TO, required(m, FIELD_TO)?)?.to_vec(),
            seq: integer(FIELD_SEQ, required(m, FIELD_SEQ)?)?.clone(),
            purposes,
            extension: optional(m, FIELD_EXTENSION)
                .map(TxExtension::from_value)
                .transpose()?
                .filter(|e| !e.is_empty()),
            call: optional(m, FIELD_CALL)
                .map(ContractCall::from_value)
                .transpose()?,
            pa: optional(m, FIELD_PA)
                .map(|v| bytes(FIELD_PA, v).map(<[u8]>::to_vec))
                .transpose()?,
        })
    }

    /// Canonical byte form: the bytes a signer signs.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(codec::to_bytes(&self.to_value())?)
    }

    pub fn to_hex(&self) -> Result<String, TransactionError> {
        Ok(codec::encode(&self.to_value())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let value = codec::from_bytes(bytes)?;
        Self::from_value(&value).map_err(|e| {
            debug!(error = %e, "transaction body rejected");
            e
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let value = codec::decode(hex_str)?;
        Self::from_value(&value).map_err(|e| {
            debug!(error = %e, "transaction body rejected");
            e
        })
    }

    /// SHA-256 of the canonical byte form. Stable across signing, so it can
    /// identify a transaction before any signature exists.
    pub fn hash(&self) -> Result<[u8; 32], TransactionError> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes()?);
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required<'v>(
    m: &'v BTreeMap<String, Value>,
    field: &'static str,
) -> Result<&'v Value, TransactionError> {
    match m.get(field) {
        Some(Value::Nil) | None => Err(TransactionError::MissingField { field }),
        Some(v) => Ok(v),
    }
}

fn optional<'v>(m: &'v BTreeMap<String, Value>, field: &str) -> Option<&'v Value> {
    m.get(field).filter(|v| !v.is_nil())
}

pub(crate) fn reject_unknown_keys(
    field: &'static str,
    m: &BTreeMap<String, Value>,
    known: &[&str],
) -> Result<(), TransactionError> {
    match m.keys().find(|k| !known.contains(&k.as_str())) {
        Some(key) => Err(TransactionError::invalid(
            field,
            format!("unexpected key {:?}", key),
        )),
        None => Ok(()),
    }
}

pub(crate) fn integer<'v>(field: &'static str, v: &'v Value) -> Result<&'v BigInt, TransactionError> {
    v.as_integer().ok_or_else(|| {
        TransactionError::invalid(field, format!("expected integer, found {}", v.type_name()))
    })
}

pub(crate) fn bytes<'v>(field: &'static str, v: &'v Value) -> Result<&'v [u8], TransactionError> {
    v.as_bytes().ok_or_else(|| {
        TransactionError::invalid(field, format!("expected binary, found {}", v.type_name()))
    })
}

fn string<'v>(field: &'static str, v: &'v Value) -> Result<&'v str, TransactionError> {
    v.as_str().ok_or_else(|| {
        TransactionError::invalid(field, format!("expected string, found {}", v.type_name()))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
