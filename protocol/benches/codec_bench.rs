// Codec benchmarks for the Power transaction protocol.
//
// Covers hex encode/decode of a typical transaction body, a signed envelope,
// and flat arrays of growing size.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use powertx_protocol::codec::{self, Value};
use powertx_protocol::transaction::{SignatureEntry, SignedTx, TxBody, TxBodyBuilder, TxKind};

fn sample_body() -> TxBody {
    TxBodyBuilder::new(TxKind::Generic)
        .sender(vec![0x80, 0x00, 0x20, 0x00, 0x02, 0x00, 0x00, 0x03])
        .receiver(vec![0x80, 0x00, 0x20, 0x00, 0x02, 0x00, 0x00, 0x07])
        .seq(42u64)
        .timestamp(1_700_000_000_000u64)
        .transfer("SK", 1_000_000u64)
        .fee("SK", 20u64)
        .message("invoice 1187")
        .build()
        .unwrap()
}

fn bench_body_encode(c: &mut Criterion) {
    let body = sample_body();
    c.bench_function("body/to_hex", |b| {
        b.iter(|| body.to_hex().unwrap());
    });
}

fn bench_body_decode(c: &mut Criterion) {
    let hex = sample_body().to_hex().unwrap();
    c.bench_function("body/from_hex", |b| {
        b.iter(|| TxBody::from_hex(&hex).unwrap());
    });
}

fn bench_envelope(c: &mut Criterion) {
    let tx = SignedTx::new(sample_body())
        .with_signature(SignatureEntry::new(vec![0x03; 33], vec![0x30; 71]));
    let hex = tx.to_hex().unwrap();

    c.bench_function("envelope/to_hex", |b| {
        b.iter(|| tx.to_hex().unwrap());
    });
    c.bench_function("envelope/from_hex", |b| {
        b.iter(|| SignedTx::from_hex(&hex).unwrap());
    });
}

fn bench_array_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec/array_roundtrip");

    for size in [10u64, 100, 1_000, 10_000] {
        let value = Value::Array((0..size).map(|i| Value::from(i * 7_919)).collect());

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| codec::decode(&codec::encode(value).unwrap()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_body_encode,
    bench_body_decode,
    bench_envelope,
    bench_array_sizes,
);
criterion_main!(benches);
