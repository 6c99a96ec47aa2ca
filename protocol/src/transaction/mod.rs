//! # Transaction Module
//!
//! The shared vocabulary of Power transactions and the structural contract
//! of an unsigned transaction body. Every producer (wallet front ends) and
//! consumer (signer, network) relies on these definitions agreeing byte for
//! byte.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — TxKindByName, TxKind, TxTag, TxPurpose and their wire codes
//! body.rs     — TxBody, Purpose, TxExtension, ContractCall
//! builder.rs  — fluent TxBodyBuilder
//! envelope.rs — SignatureEntry (TLV) and the SignedTx envelope
//! error.rs    — TransactionError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** — assemble a [`TxBody`] with [`TxBodyBuilder`] right before
//!    signing.
//! 2. **Sign** — hand [`SignedTx::signing_payload`] to an external signer.
//! 3. **Wrap** — attach the returned [`SignatureEntry`] and serialize the
//!    [`SignedTx`] for submission.
//!
//! Nothing here persists a transaction; that is the caller's business.

pub mod body;
pub mod builder;
pub mod envelope;
pub mod error;
pub mod types;

pub use body::{ContractCall, Purpose, TxBody, TxExtension};
pub use builder::TxBodyBuilder;
pub use envelope::{SignatureEntry, SignedTx};
pub use error::TransactionError;
pub use types::{TxKind, TxKindByName, TxPurpose, TxTag};
