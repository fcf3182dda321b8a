//! # Zero-Knowledge Uniqueness Proofs
//!
//! Capability-proof sources (World ID style) skip the oracle entirely: the
//! user proves, in zero knowledge, that
//!
//! - their identity commitment is a leaf of a known commitment tree, and
//! - the nullifier they present is the one their secret derives for this
//!   action,
//!
//! while binding the proof to the subject address that submits it. The
//! adapter verifies with Groth16 over BN254 and uses the nullifier hash as
//! the replay key, exactly like an identity key.
//!
//! ## Architecture
//!
//! ```text
//! membership.rs  — native params, identity commitments, Merkle tree, nullifiers
//! circuit.rs     — R1CS circuit (UniquenessCircuit)
//! prover.rs      — Groth16 setup + proof generation (UniquenessProver, UniquenessProof)
//! verifier.rs    — Groth16 verification (UniquenessVerifier)
//! ```
//!
//! ## Security Model
//!
//! - **Membership**: soundness of Groth16 plus collision resistance of the
//!   x^5 compression.
//! - **Unlinkability**: the nullifier reveals nothing about which leaf is
//!   the prover's.
//! - **One per action**: the nullifier is a function of the secret and the
//!   external nullifier only.
//!
//! The CRS is per-circuit. Production deployments load it from a ceremony
//! rather than calling `UniquenessProver::setup` with a local RNG.

pub mod circuit;
pub mod membership;
pub mod prover;
pub mod verifier;

pub use circuit::UniquenessCircuit;
pub use membership::{
    external_nullifier, fr_from_bytes, fr_to_bytes, signal_hash, Identity, MembershipParams,
    MerklePath, MerkleTree,
};
pub use prover::{UniquenessProof, UniquenessProver};
pub use verifier::UniquenessVerifier;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_capability, encode_capability};
    use crate::identity::Address;
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    const DEPTH: usize = 6;

    /// End-to-end: tree -> prove -> wire -> verify.
    #[test]
    fn end_to_end_uniqueness_proof() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::standard();
        let (prover, verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();

        let mut tree = MerkleTree::new(params.clone(), DEPTH);
        for _ in 0..3 {
            tree.insert(Identity::random(&mut rng).commitment(&params)).unwrap();
        }
        let me = Identity::random(&mut rng);
        let idx = tree.insert(me.commitment(&params)).unwrap();

        let subject = Address::derive("alice");
        let ext = external_nullifier("app_notabot", "verify-human");
        let proof = prover
            .prove(&me, &tree.path(idx).unwrap(), signal_hash(&subject), ext)
            .unwrap();

        let wire = encode_capability(&proof.to_capability());
        let decoded = UniquenessProof::from_capability(&decode_capability(&wire).unwrap()).unwrap();

        assert!(verifier.verify(&decoded, signal_hash(&subject), ext).unwrap());
        assert!(!verifier
            .verify(&decoded, signal_hash(&Address::derive("mallory")), ext)
            .unwrap());
        assert_eq!(decoded.merkle_root, tree.root());
    }

    /// Same identity, same action: same nullifier, so a second proof is a replay.
    #[test]
    fn nullifier_is_stable_across_proofs() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::standard();
        let (prover, _verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();

        let mut tree = MerkleTree::new(params.clone(), DEPTH);
        let me = Identity::random(&mut rng);
        let idx = tree.insert(me.commitment(&params)).unwrap();
        let path = tree.path(idx).unwrap();
        let ext = external_nullifier("app", "verify-human");

        let a = prover.prove(&me, &path, signal_hash(&Address::derive("a")), ext).unwrap();
        let b = prover.prove(&me, &path, signal_hash(&Address::derive("b")), ext).unwrap();
        assert_eq!(a.nullifier_hash, b.nullifier_hash);
    }
}
