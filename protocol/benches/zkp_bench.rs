// Zero-knowledge uniqueness proof benchmarks for NotABot.
//
// Benchmarks Groth16 setup, proof generation, and verification for the
// membership + nullifier circuit over BN254, plus native tree insertion.

use criterion::{criterion_group, criterion_main, Criterion};

use ark_std::rand::{rngs::StdRng, SeedableRng};

use notabot_protocol::config::MERKLE_TREE_DEPTH;
use notabot_protocol::identity::Address;
use notabot_protocol::zkp::{
    external_nullifier, signal_hash, Identity, MembershipParams, MerkleTree, UniquenessProver,
};

fn bench_groth16_setup(c: &mut Criterion) {
    c.bench_function("zkp/groth16_setup", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            UniquenessProver::setup(&mut rng, MembershipParams::standard(), MERKLE_TREE_DEPTH)
                .unwrap()
        });
    });
}

fn bench_tree_insert(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let params = MembershipParams::standard();
    let leaf = Identity::random(&mut rng).commitment(&params);

    c.bench_function("zkp/tree_insert", |b| {
        b.iter(|| {
            let mut tree = MerkleTree::new(params.clone(), MERKLE_TREE_DEPTH);
            tree.insert(leaf).unwrap()
        });
    });
}

fn bench_groth16_prove(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let params = MembershipParams::standard();
    let (prover, _verifier) =
        UniquenessProver::setup(&mut rng, params.clone(), MERKLE_TREE_DEPTH).unwrap();

    let me = Identity::random(&mut rng);
    let mut tree = MerkleTree::new(params.clone(), MERKLE_TREE_DEPTH);
    let idx = tree.insert(me.commitment(&params)).unwrap();
    let path = tree.path(idx).unwrap();
    let signal = signal_hash(&Address::derive("alice"));
    let ext = external_nullifier("app_notabot", "verify-human");

    c.bench_function("zkp/groth16_prove", |b| {
        b.iter(|| prover.prove(&me, &path, signal, ext).unwrap());
    });
}

fn bench_groth16_verify(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let params = MembershipParams::standard();
    let (prover, verifier) =
        UniquenessProver::setup(&mut rng, params.clone(), MERKLE_TREE_DEPTH).unwrap();

    let me = Identity::random(&mut rng);
    let mut tree = MerkleTree::new(params.clone(), MERKLE_TREE_DEPTH);
    let idx = tree.insert(me.commitment(&params)).unwrap();
    let signal = signal_hash(&Address::derive("alice"));
    let ext = external_nullifier("app_notabot", "verify-human");
    let proof = prover.prove(&me, &tree.path(idx).unwrap(), signal, ext).unwrap();

    c.bench_function("zkp/groth16_verify", |b| {
        b.iter(|| verifier.verify(&proof, signal, ext).unwrap());
    });
}

criterion_group!(
    benches,
    bench_groth16_setup,
    bench_tree_insert,
    bench_groth16_prove,
    bench_groth16_verify,
);
criterion_main!(benches);
