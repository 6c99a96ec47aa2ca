//! End-to-end tests for the Power transaction protocol.
//!
//! These tests go through the public API only: build a body, serialize it to
//! hex the way a wallet would before handing it to the SDK, collect a
//! signature produced elsewhere, and parse everything back on the other side.
//! Byte vectors are fixed so any drift in the wire format fails loudly.

use num_bigint::BigInt;

use powertx_protocol::codec::{self, CodecError, Value};
use powertx_protocol::transaction::{
    SignatureEntry, SignedTx, TransactionError, TxBody, TxBodyBuilder, TxKind, TxPurpose,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const ALICE: [u8; 8] = [0x80, 0x00, 0x20, 0x00, 0x02, 0x00, 0x00, 0x03];
const BOB: [u8; 8] = [0x80, 0x00, 0x20, 0x00, 0x02, 0x00, 0x00, 0x07];

fn transfer(seq: u64, amount: u64) -> TxBody {
    TxBodyBuilder::new(TxKind::Generic)
        .sender(ALICE.to_vec())
        .receiver(BOB.to_vec())
        .seq(seq)
        .timestamp(1_700_000_000_000u64)
        .transfer("POW", amount)
        .fee("SK", 20u64)
        .build()
        .expect("valid transfer")
}

// ---------------------------------------------------------------------------
// 1. Fixed wire vectors
// ---------------------------------------------------------------------------

#[test]
fn object_vector() {
    let v = Value::map([("a", Value::from(1u8)), ("b", Value::from("x"))]);
    assert_eq!(codec::encode(&v).unwrap(), "82a16101a162a178");
    assert_eq!(codec::decode("82a16101a162a178").unwrap(), v);
}

#[test]
fn scalar_vectors() {
    let cases = [
        (Value::Nil, "c0"),
        (Value::Bool(true), "c3"),
        (Value::from(-1i8), "ff"),
        (Value::Float(1.5), "cb3ff8000000000000"),
        (Value::Binary(vec![1, 2]), "c4020102"),
        (Value::Array(vec![]), "90"),
        (Value::map(Vec::<(String, Value)>::new()), "80"),
    ];
    for (value, hex) in cases {
        assert_eq!(codec::encode(&value).unwrap(), hex, "encoding {:?}", value);
        assert_eq!(codec::decode(hex).unwrap(), value);
    }
}

#[test]
fn minimal_body_vector() {
    let body = TxBody::new(TxKind::Generic, 1u8, vec![1], vec![2], 3u8, vec![]);
    assert_eq!(
        body.to_hex().unwrap(),
        "86a166c40101a16b10a17090a17303a17401a2746fc40102"
    );
}

#[test]
fn purpose_entry_vector() {
    let body = TxBody::new(
        TxKind::Generic,
        1u8,
        vec![1],
        vec![2],
        3u8,
        vec![powertx_protocol::transaction::Purpose::new(
            TxPurpose::Transfer,
            "POW",
            100u8,
        )],
    );
    assert_eq!(codec::encode(&body.purposes_to_value()).unwrap(), "919300a3504f5764");
}

// ---------------------------------------------------------------------------
// 2. Transfer lifecycle
// ---------------------------------------------------------------------------

#[test]
fn transfer_lifecycle() {
    let body = transfer(1, 100);
    assert!(body.moves_value());

    // The wallet serializes the body for the signer.
    let tx = SignedTx::new(body.clone());
    let payload = tx.signing_payload().unwrap();
    assert_eq!(TxBody::from_bytes(&payload).unwrap(), body);

    // A signature arrives from outside and is attached.
    let signed = tx.with_signature(SignatureEntry::new(vec![0x03; 33], vec![0x30; 71]));
    let hex = signed.to_hex().unwrap();
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

    // The receiving side recovers the exact body and signature.
    let received = SignedTx::from_hex(&hex).unwrap();
    assert_eq!(received, signed);
    assert_eq!(received.body().purposes()[0].amount, BigInt::from(100));
    assert_eq!(received.body().hash().unwrap(), body.hash().unwrap());
}

#[test]
fn purpose_order_and_amounts_are_preserved() {
    let body = TxBodyBuilder::new(TxKind::Generic)
        .sender(ALICE.to_vec())
        .receiver(BOB.to_vec())
        .seq(9u8)
        .gas("SK", 1u8)
        .transfer("POW", u64::MAX)
        .purpose(TxPurpose::GasSponsor, "SK", 2u8)
        .sponsor(BOB.to_vec())
        .build()
        .unwrap();

    let recovered = TxBody::from_hex(&body.to_hex().unwrap()).unwrap();
    let purposes: Vec<_> = recovered
        .purposes()
        .iter()
        .map(|p| (p.purpose, p.asset.clone(), p.amount.clone()))
        .collect();
    assert_eq!(
        purposes,
        vec![
            (TxPurpose::Gas, "SK".to_string(), BigInt::from(1)),
            (TxPurpose::Transfer, "POW".to_string(), BigInt::from(u64::MAX)),
            (TxPurpose::GasSponsor, "SK".to_string(), BigInt::from(2)),
        ]
    );
}

#[test]
fn sequence_numbers_change_the_hash() {
    assert_ne!(
        transfer(1, 100).hash().unwrap(),
        transfer(2, 100).hash().unwrap()
    );
}

// ---------------------------------------------------------------------------
// 3. Trust boundary
// ---------------------------------------------------------------------------

#[test]
fn malformed_transport_is_reported() {
    for bad in ["", "0", "g1", "zz", "c1", "82a16101"] {
        match TxBody::from_hex(bad) {
            Err(TransactionError::Codec(CodecError::MalformedEncoding { .. })) => {}
            other => panic!("{:?} decoded to {:?}", bad, other),
        }
    }
}

#[test]
fn unknown_kind_from_foreign_encoder() {
    // Same as the minimal body vector with k = 0x14.
    let hex = "86a166c40101a16b14a17090a17303a17401a2746fc40102";
    assert!(matches!(
        TxBody::from_hex(hex),
        Err(TransactionError::UnknownTransactionKind { .. })
    ));
}

#[test]
fn unknown_purpose_from_foreign_encoder() {
    // Minimal body with p = [[0x02, "POW", 100]].
    let hex = "86a166c40101a16b10a170919302a3504f5764a17303a17401a2746fc40102";
    assert_eq!(
        TxBody::from_hex(hex),
        Err(TransactionError::UnknownPurposeCode {
            code: BigInt::from(2)
        })
    );
}

#[test]
fn non_canonical_integers_from_foreign_encoder() {
    // k as uint8, s as uint64: still a valid body.
    let hex = "86a166c40101a16bcc10a17090a173cf0000000000000003a17401a2746fc40102";
    let body = TxBody::from_hex(hex).unwrap();
    assert_eq!(body.kind(), TxKind::Generic);
    assert_eq!(body.seq(), &BigInt::from(3));
    // Re-encoding yields the canonical form.
    assert_eq!(
        body.to_hex().unwrap(),
        "86a166c40101a16b10a17090a17303a17401a2746fc40102"
    );
}
