// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Power Transaction Protocol — Core Library
//!
//! The transaction-encoding data model of the Power wallet ecosystem and
//! the canonical object codec that carries it between systems.
//!
//! ## Architecture
//!
//! - **codec** — Deterministic MessagePack encoding of structured values,
//!   transported as lowercase hex.
//! - **transaction** — Kind, tag and purpose codes, the unsigned body, a
//!   builder, and the signed envelope layout.
//! - **config** — Wire constants and codec limits.
//!
//! Everything in this crate is synchronous and stateless. Network
//! submission, key custody and address validation belong to the caller.

pub mod codec;
pub mod config;
pub mod transaction;

pub use codec::{decode, encode, CodecError, Value};
pub use transaction::{TransactionError, TxBody, TxBodyBuilder, TxKind, TxPurpose};
