//! Core vocabulary of Power transactions.
//!
//! Every numeric code below is a wire contract with the network and the
//! signing SDK. Codes are never renumbered; new members get new codes.
//!
//! Two kind namespaces exist side by side. [`TxKindByName`] is the
//! lower-case vocabulary used by call sites that select a kind by name;
//! [`TxKind`] is the current upper-case vocabulary written into `TxBody.k`.
//! Where both declare the same name they currently agree on the code, but
//! they are versioned independently and are never collapsed into one type.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::error::TransactionError;

// ---------------------------------------------------------------------------
// TxKindByName
// ---------------------------------------------------------------------------

/// Transaction kinds addressed by their lower-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TxKindByName {
    Generic = 16,
    Register = 17,
    Deploy = 18,
    Patch = 19,
    Block = 20,
    Lstore = 22,
    Notify = 23,
    Chkey = 24,
}

impl TxKindByName {
    /// Every member, in code order.
    pub const ALL: [TxKindByName; 8] = [
        Self::Generic,
        Self::Register,
        Self::Deploy,
        Self::Patch,
        Self::Block,
        Self::Lstore,
        Self::Notify,
        Self::Chkey,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, TransactionError> {
        Self::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .ok_or_else(|| TransactionError::UnknownTransactionKind {
                code: BigInt::from(code),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Register => "register",
            Self::Deploy => "deploy",
            Self::Patch => "patch",
            Self::Block => "block",
            Self::Lstore => "lstore",
            Self::Notify => "notify",
            Self::Chkey => "chkey",
        }
    }

    /// The [`TxKind`] member with the same name, if that namespace declares
    /// one. `block`, `notify` and `chkey` have no counterpart.
    ///
    /// Both the name and the code must agree; a pair that disagrees on the
    /// code yields `None` instead of silently picking one side.
    pub fn as_tx_kind(self) -> Option<TxKind> {
        let candidate = match self {
            Self::Generic => TxKind::Generic,
            Self::Register => TxKind::Register,
            Self::Deploy => TxKind::Deploy,
            Self::Patch => TxKind::Patch,
            Self::Lstore => TxKind::Lstore,
            Self::Block | Self::Notify | Self::Chkey => return None,
        };
        (candidate.code() == self.code()).then_some(candidate)
    }
}

impl fmt::Display for TxKindByName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TxKindByName {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| TransactionError::UnknownKindName {
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// TxKind
// ---------------------------------------------------------------------------

/// Transaction kinds as written into the `k` field of a [`super::TxBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum TxKind {
    Generic = 0x10,
    Register = 0x11,
    Deploy = 0x12,
    Patch = 0x13,
    Lstore = 0x16,
}

impl TxKind {
    /// Every member, in code order.
    pub const ALL: [TxKind; 5] = [
        Self::Generic,
        Self::Register,
        Self::Deploy,
        Self::Patch,
        Self::Lstore,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, TransactionError> {
        Self::ALL
            .into_iter()
            .find(|k| k.code() == code)
            .ok_or_else(|| TransactionError::UnknownTransactionKind {
                code: BigInt::from(code),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::Register => "REGISTER",
            Self::Deploy => "DEPLOY",
            Self::Patch => "PATCH",
            Self::Lstore => "LSTORE",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TxKind {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| TransactionError::UnknownKindName {
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// TxTag
// ---------------------------------------------------------------------------

/// Marker bytes identifying a field inside a serialized signature entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxTag {
    /// The signer's public key.
    PublicKey = 0x02,
    /// The signature bytes.
    Signature = 0xff,
}

impl TxTag {
    pub const ALL: [TxTag; 2] = [Self::PublicKey, Self::Signature];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, TransactionError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(TransactionError::UnknownTag { code })
    }
}

// ---------------------------------------------------------------------------
// TxPurpose
// ---------------------------------------------------------------------------

/// Classifies one value-movement line item of a transaction.
///
/// Fee and gas purposes come in two flavours: paid by the sender, or paid by
/// a sponsor named in the body's extension block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxPurpose {
    /// Plain value transfer to the recipient.
    Transfer = 0x00,
    /// Fee paid by the sender.
    SrcFee = 0x01,
    /// Gas paid by the sender.
    Gas = 0x03,
    /// Fee paid by the sponsor.
    SrcFeeSponsor = 0x21,
    /// Gas paid by the sponsor.
    GasSponsor = 0x23,
}

impl TxPurpose {
    pub const ALL: [TxPurpose; 5] = [
        Self::Transfer,
        Self::SrcFee,
        Self::Gas,
        Self::SrcFeeSponsor,
        Self::GasSponsor,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, TransactionError> {
        Self::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| TransactionError::UnknownPurposeCode {
                code: BigInt::from(code),
            })
    }

    /// Returns `true` for the purposes charged to a sponsor.
    pub fn is_sponsored(self) -> bool {
        matches!(self, Self::SrcFeeSponsor | Self::GasSponsor)
    }
}

impl fmt::Display for TxPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "TRANSFER"),
            Self::SrcFee => write!(f, "SRCFEE"),
            Self::Gas => write!(f, "GAS"),
            Self::SrcFeeSponsor => write!(f, "SRCFEE_SPONSOR"),
            Self::GasSponsor => write!(f, "GAS_SPONSOR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unique<T: std::hash::Hash + Eq>(codes: impl IntoIterator<Item = T>) -> bool {
        let mut seen = HashSet::new();
        codes.into_iter().all(|c| seen.insert(c))
    }

    #[test]
    fn codes_are_unique_per_enumeration() {
        assert!(unique(TxKindByName::ALL.map(TxKindByName::code)));
        assert!(unique(TxKind::ALL.map(TxKind::code)));
        assert!(unique(TxTag::ALL.map(TxTag::code)));
        assert!(unique(TxPurpose::ALL.map(TxPurpose::code)));
    }

    #[test]
    fn wire_codes_are_fixed() {
        assert_eq!(TxKindByName::Generic.code(), 16);
        assert_eq!(TxKindByName::Lstore.code(), 22);
        assert_eq!(TxKindByName::Chkey.code(), 24);
        assert_eq!(TxKind::Generic.code(), 0x10);
        assert_eq!(TxKind::Lstore.code(), 0x16);
        assert_eq!(TxTag::PublicKey.code(), 0x02);
        assert_eq!(TxTag::Signature.code(), 0xff);
        assert_eq!(TxPurpose::Transfer.code(), 0x00);
        assert_eq!(TxPurpose::GasSponsor.code(), 0x23);
    }

    #[test]
    fn overlapping_names_agree_on_codes() {
        for by_name in TxKindByName::ALL {
            if let Ok(kind) = by_name.name().to_uppercase().parse::<TxKind>() {
                assert_eq!(
                    by_name.as_tx_kind(),
                    Some(kind),
                    "{} maps to a different code in the two namespaces",
                    by_name
                );
            } else {
                assert_eq!(by_name.as_tx_kind(), None);
            }
        }
    }

    #[test]
    fn from_code_round_trips_every_member() {
        for k in TxKind::ALL {
            assert_eq!(TxKind::from_code(k.code()).unwrap(), k);
        }
        for k in TxKindByName::ALL {
            assert_eq!(TxKindByName::from_code(k.code()).unwrap(), k);
        }
        for p in TxPurpose::ALL {
            assert_eq!(TxPurpose::from_code(p.code()).unwrap(), p);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(matches!(
            TxKind::from_code(0x14),
            Err(TransactionError::UnknownTransactionKind { .. })
        ));
        assert!(matches!(
            TxKindByName::from_code(21),
            Err(TransactionError::UnknownTransactionKind { .. })
        ));
        assert_eq!(
            TxTag::from_code(0x01),
            Err(TransactionError::UnknownTag { code: 0x01 })
        );
        assert!(matches!(
            TxPurpose::from_code(0x02),
            Err(TransactionError::UnknownPurposeCode { .. })
        ));
    }

    #[test]
    fn names_parse_and_display() {
        assert_eq!("deploy".parse::<TxKindByName>().unwrap(), TxKindByName::Deploy);
        assert_eq!("DEPLOY".parse::<TxKind>().unwrap(), TxKind::Deploy);
        assert_eq!(TxKindByName::Notify.to_string(), "notify");
        assert_eq!(TxKind::Patch.to_string(), "PATCH");
        assert!("Deploy".parse::<TxKind>().is_err());
    }

    #[test]
    fn sponsored_purposes() {
        assert!(TxPurpose::GasSponsor.is_sponsored());
        assert!(!TxPurpose::Gas.is_sponsored());
    }

    #[test]
    fn kind_serde_roundtrip() {
        for k in TxKind::ALL {
            let json = serde_json::to_string(&k).unwrap();
            let recovered: TxKind = serde_json::from_str(&json).unwrap();
            assert_eq!(k, recovered);
        }
        assert_eq!(serde_json::to_string(&TxKindByName::Chkey).unwrap(), "\"chkey\"");
    }
}
