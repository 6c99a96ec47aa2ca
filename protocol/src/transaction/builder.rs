//! Transaction body construction via the builder pattern.
//!
//! The [`TxBodyBuilder`] collects fields in any order, fills in the
//! timestamp if the caller did not, and checks that every required field is
//! present before producing an immutable [`TxBody`].

use chrono::Utc;
use num_bigint::BigInt;

use super::body::{ContractCall, Purpose, TxBody, TxExtension, FIELD_FROM, FIELD_SEQ, FIELD_TO};
use super::error::TransactionError;
use super::types::{TxKind, TxPurpose};

/// Fluent builder for unsigned [`TxBody`] values.
///
/// # Usage
///
/// ```
/// use powertx_protocol::transaction::{TxBodyBuilder, TxKind};
///
/// let body = TxBodyBuilder::new(TxKind::Generic)
///     .sender(vec![0x80, 0, 0x20, 0, 2, 0, 0, 3])
///     .receiver(vec![0x80, 0, 0x20, 0, 2, 0, 0, 7])
///     .seq(42u64)
///     .transfer("SK", 1_000u64)
///     .fee("SK", 20u64)
///     .build()
///     .unwrap();
///
/// assert_eq!(body.purposes().len(), 2);
/// ```
///
/// Purposes are kept in the order they were added; that order is the order
/// the network applies them in.
#[derive(Debug, Clone)]
pub struct TxBodyBuilder {
    kind: TxKind,
    timestamp: Option<BigInt>,
    from: Option<Vec<u8>>,
    to: Option<Vec<u8>>,
    seq: Option<BigInt>,
    purposes: Vec<Purpose>,
    extension: TxExtension,
    call: Option<ContractCall>,
    pa: Option<Vec<u8>>,
}

impl TxBodyBuilder {
    pub fn new(kind: TxKind) -> Self {
        Self {
            kind,
            timestamp: None,
            from: None,
            to: None,
            seq: None,
            purposes: Vec::new(),
            extension: TxExtension::default(),
            call: None,
            pa: None,
        }
    }

    /// Sets the timestamp explicitly (Unix milliseconds).
    ///
    /// If not called, `build()` uses the current UTC time.
    pub fn timestamp(mut self, t: impl Into<BigInt>) -> Self {
        self.timestamp = Some(t.into());
        self
    }

    pub fn sender(mut self, address: Vec<u8>) -> Self {
        self.from = Some(address);
        self
    }

    pub fn receiver(mut self, address: Vec<u8>) -> Self {
        self.to = Some(address);
        self
    }

    /// Sets the sender's sequence number.
    pub fn seq(mut self, seq: impl Into<BigInt>) -> Self {
        self.seq = Some(seq.into());
        self
    }

    /// Appends a purpose entry.
    pub fn purpose(
        mut self,
        purpose: TxPurpose,
        asset: impl Into<String>,
        amount: impl Into<BigInt>,
    ) -> Self {
        self.purposes.push(Purpose::new(purpose, asset, amount));
        self
    }

    pub fn transfer(self, asset: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        self.purpose(TxPurpose::Transfer, asset, amount)
    }

    /// Appends a sender-paid fee.
    pub fn fee(self, asset: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        self.purpose(TxPurpose::SrcFee, asset, amount)
    }

    /// Appends sender-paid gas.
    pub fn gas(self, asset: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        self.purpose(TxPurpose::Gas, asset, amount)
    }

    /// Names the account paying the sponsored purposes.
    pub fn sponsor(mut self, address: Vec<u8>) -> Self {
        self.extension.sponsor = Some(address);
        self
    }

    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.extension.msg = Some(msg.into());
        self
    }

    pub fn contract_call(mut self, method: impl Into<String>, args: Vec<u8>) -> Self {
        self.call = Some(ContractCall::new(method, args));
        self
    }

    pub fn pa(mut self, pa: Vec<u8>) -> Self {
        self.pa = Some(pa);
        self
    }

    /// Consumes the builder and produces a [`TxBody`].
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MissingField`] if the sender, receiver or
    ///   sequence number was never set.
    /// - [`TransactionError::EmptyPurposes`] for a `GENERIC` transaction
    ///   with neither purposes nor a contract call.
    pub fn build(self) -> Result<TxBody, TransactionError> {
        let from = self.from.ok_or(TransactionError::MissingField { field: FIELD_FROM })?;
        let to = self.to.ok_or(TransactionError::MissingField { field: FIELD_TO })?;
        let seq = self.seq.ok_or(TransactionError::MissingField { field: FIELD_SEQ })?;

        if self.kind == TxKind::Generic && self.purposes.is_empty() && self.call.is_none() {
            return Err(TransactionError::EmptyPurposes);
        }

        let timestamp = self
            .timestamp
            .unwrap_or_else(|| BigInt::from(Utc::now().timestamp_millis()));

        let mut body = TxBody::new(self.kind, timestamp, from, to, seq, self.purposes)
            .with_extension(self.extension);
        if let Some(call) = self.call {
            body = body.with_contract_call(call);
        }
        if let Some(pa) = self.pa {
            body = body.with_pa(pa);
        }
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
