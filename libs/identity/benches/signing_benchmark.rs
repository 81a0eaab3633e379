//! Performance benchmarks for board-identity
//!
//! Signing is one SHA-256 plus one full-width modular exponentiation with
//! the private exponent, so its cost tracks the modulus size, not the
//! message. Key generation is benchmarked separately since it dominates
//! bootstrap time.

use board_identity::test_utils::{FixedEntropy, test_config, test_identity};
use board_identity::{IdentityConfig, SigningIdentity, verify};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Benchmark signing across message sizes
fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("RSA-1024 Signing");
    let identity = test_identity(42).unwrap();

    for size in &[4, 64, 1024, 16384] {
        let data = vec![0x5Au8; *size];
        group.bench_with_input(BenchmarkId::new("sign", size), size, |b, _| {
            b.iter(|| identity.sign(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the verification oracle
fn bench_verification(c: &mut Criterion) {
    let identity = test_identity(42).unwrap();
    let public = identity.public_key();
    let signature = identity.sign(b"ping").unwrap();

    c.bench_function("verify", |b| {
        b.iter(|| {
            verify(
                black_box(&public),
                black_box(b"ping"),
                black_box(signature.as_str()),
            )
            .unwrap()
        });
    });
}

/// Benchmark key generation at several modulus sizes
fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Key Generation");
    group.sample_size(10);

    for bits in &[768usize, 1024, 2048] {
        let config = IdentityConfig {
            modulus_bits: *bits,
            ..test_config()
        };
        group.bench_with_input(BenchmarkId::new("generate", bits), bits, |b, _| {
            let mut seed = 0u8;
            b.iter(|| {
                seed = seed.wrapping_add(1);
                SigningIdentity::generate(black_box(&config), &mut FixedEntropy::new(seed))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_signing,
    bench_verification,
    bench_key_generation
);
criterion_main!(benches);
