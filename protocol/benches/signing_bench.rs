// Attestation signing & verification benchmarks for NotABot.
//
// Covers oracle key generation, identity-key derivation, attestation
// issuance, signature checks, and the wire codec adapters run on every
// submission.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use notabot_protocol::attestation::OracleSigner;
use notabot_protocol::codec::{decode_signed, encode_attestation};
use notabot_protocol::crypto::keys::OracleKeypair;
use notabot_protocol::identity::{derive_identity_key, Address};
use notabot_protocol::source::Source;

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(OracleKeypair::generate);
    });
}

fn bench_identity_key(c: &mut Criterion) {
    let subject = Address::derive("alice");

    c.bench_function("attestation/derive_identity_key", |b| {
        b.iter(|| derive_identity_key(Source::Gitcoin, &subject, "42.137"));
    });
}

fn bench_issue_attestation(c: &mut Criterion) {
    let signer = OracleSigner::new(OracleKeypair::generate());
    let subject = Address::derive("alice");
    let key = derive_identity_key(Source::Gitcoin, &subject, "42.137");

    c.bench_function("attestation/issue", |b| {
        b.iter(|| signer.issue_attestation(subject, key, Some(42), 1_700_000_000));
    });
}

fn bench_verify_attestation(c: &mut Criterion) {
    let signer = OracleSigner::new(OracleKeypair::generate());
    let subject = Address::derive("alice");
    let key = derive_identity_key(Source::Gitcoin, &subject, "42.137");
    let att = signer.issue_attestation(subject, key, Some(42), 1_700_000_000);
    let public_key = signer.public_key();

    c.bench_function("attestation/verify", |b| {
        b.iter(|| att.verify(&public_key).is_ok());
    });
}

fn bench_decode_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("attestation/decode_verify_batch");
    let signer = OracleSigner::new(OracleKeypair::generate());
    let public_key = signer.public_key();

    for size in [10, 50, 100, 500] {
        let items: Vec<_> = (0..size)
            .map(|i| {
                let subject = Address::derive(&format!("subject-{i:06}"));
                let key = derive_identity_key(Source::Poh, &subject, &format!("sub-{i}"));
                let att = signer.issue_attestation(subject, key, None, 1_700_000_000);
                (subject, encode_attestation(&att))
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| {
                for (subject, bytes) in items {
                    let proof = decode_signed(bytes, false).unwrap();
                    let digest = notabot_protocol::attestation::canonical_digest(
                        subject,
                        &proof.identity_key,
                        proof.score,
                        proof.issued_at,
                    );
                    notabot_protocol::crypto::verify_digest(&public_key, &digest, &proof.signature)
                        .unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_identity_key,
    bench_issue_attestation,
    bench_verify_attestation,
    bench_decode_and_verify,
);
criterion_main!(benches);
