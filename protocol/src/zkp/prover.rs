//! # Groth16 Proof Generation
//!
//! Wraps `ark-groth16` for the uniqueness circuit:
//!
//! 1. **Setup**: `UniquenessProver::setup(rng, params, depth)` once per
//!    circuit shape. Produces the proving key and the matching
//!    [`UniquenessVerifier`]. In production the CRS comes from an MPC
//!    ceremony, not a local RNG.
//! 2. **Prove**: `prove(identity, path, signal_hash, external_nullifier)`
//!    fills a [`UniquenessCircuit`] and runs `Groth16::prove`.
//! 3. The resulting [`UniquenessProof`] converts straight into the
//!    capability wire format the adapter consumes.

use anyhow::{Context, Result};
use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, Rng};
use tracing::debug;

use super::circuit::UniquenessCircuit;
use super::membership::{fr_from_bytes, fr_to_bytes, Identity, MembershipParams, MerklePath};
use super::verifier::UniquenessVerifier;
use crate::codec::{CapabilityProof, CAPABILITY_PROOF_LENGTH};

// ---------------------------------------------------------------------------
// UniquenessProver
// ---------------------------------------------------------------------------

/// Holds the proving key. Large and immutable; keep one per process.
pub struct UniquenessProver {
    pk: ProvingKey<Bn254>,
    params: MembershipParams,
    depth: usize,
}

impl UniquenessProver {
    /// Run the circuit-specific Groth16 setup.
    pub fn setup<R: Rng + CryptoRng>(
        rng: &mut R,
        params: MembershipParams,
        depth: usize,
    ) -> Result<(Self, UniquenessVerifier)> {
        let blank = UniquenessCircuit::blank(&params, depth);
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(blank, rng)
            .context("Groth16 setup failed for uniqueness circuit")?;

        let verifier = UniquenessVerifier::from_vk(vk, depth);
        Ok((Self { pk, params, depth }, verifier))
    }

    pub fn params(&self) -> &MembershipParams {
        &self.params
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Prove membership and emit the scoped nullifier.
    ///
    /// # Errors
    ///
    /// Fails when the path depth doesn't match the setup or the witness
    /// does not satisfy the circuit.
    pub fn prove(
        &self,
        identity: &Identity,
        path: &MerklePath,
        signal_hash: Fr,
        external_nullifier: Fr,
    ) -> Result<UniquenessProof> {
        anyhow::ensure!(
            path.depth() == self.depth,
            "path depth {} does not match circuit depth {}",
            path.depth(),
            self.depth
        );

        let circuit =
            UniquenessCircuit::new(&self.params, identity, path, signal_hash, external_nullifier);
        let merkle_root = circuit
            .merkle_root
            .context("circuit missing merkle root")?;
        let nullifier_hash = circuit
            .nullifier_hash
            .context("circuit missing nullifier hash")?;

        let mut rng = ark_std::rand::thread_rng();
        let proof = Groth16::<Bn254>::prove(&self.pk, circuit, &mut rng)
            .context("Groth16 proof generation failed (witness likely unsatisfiable)")?;

        let mut proof_bytes = Vec::with_capacity(CAPABILITY_PROOF_LENGTH);
        proof
            .serialize_uncompressed(&mut proof_bytes)
            .context("proof serialization failed")?;
        let proof_bytes: [u8; CAPABILITY_PROOF_LENGTH] = proof_bytes
            .as_slice()
            .try_into()
            .context("uncompressed proof has unexpected size")?;

        debug!(depth = self.depth, "uniqueness proof generated");
        Ok(UniquenessProof {
            merkle_root,
            nullifier_hash,
            proof_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// UniquenessProof
// ---------------------------------------------------------------------------

/// A Groth16 proof plus the two public values that travel with it.
///
/// The signal and external nullifier are not carried: the verifier
/// recomputes them from the submitting subject and its own action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniquenessProof {
    pub merkle_root: Fr,
    pub nullifier_hash: Fr,
    proof_bytes: [u8; CAPABILITY_PROOF_LENGTH],
}

impl UniquenessProof {
    pub fn proof_bytes(&self) -> &[u8; CAPABILITY_PROOF_LENGTH] {
        &self.proof_bytes
    }

    /// Wire form: `merkle_root | nullifier_hash | proof[8]`.
    pub fn to_capability(&self) -> CapabilityProof {
        CapabilityProof {
            merkle_root: fr_to_bytes(&self.merkle_root),
            nullifier_hash: fr_to_bytes(&self.nullifier_hash),
            proof: self.proof_bytes,
        }
    }

    /// Parse and validate the wire form. Rejects non-canonical field
    /// elements and points off the curve.
    pub fn from_capability(wire: &CapabilityProof) -> Result<Self> {
        let merkle_root =
            fr_from_bytes(&wire.merkle_root).context("merkle root is not a field element")?;
        let nullifier_hash = fr_from_bytes(&wire.nullifier_hash)
            .context("nullifier hash is not a field element")?;
        Ok(Self {
            merkle_root,
            nullifier_hash,
            proof_bytes: wire.proof,
        })
    }

    pub(crate) fn to_ark_proof(&self) -> Result<ark_groth16::Proof<Bn254>> {
        ark_groth16::Proof::<Bn254>::deserialize_uncompressed(&self.proof_bytes[..])
            .map_err(|e| anyhow::anyhow!("proof deserialization failed: {}", e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zkp::membership::{external_nullifier, MerkleTree};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    const DEPTH: usize = 4;

    #[test]
    fn prove_valid_member() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::setup(&mut rng);
        let (prover, _verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();

        let identity = Identity::random(&mut rng);
        let mut tree = MerkleTree::new(params, DEPTH);
        let idx = tree.insert(identity.commitment(prover.params())).unwrap();
        let path = tree.path(idx).unwrap();

        let proof = prover
            .prove(&identity, &path, Fr::from(7u64), external_nullifier("a", "b"))
            .unwrap();
        assert_eq!(proof.merkle_root, tree.root());
        assert_eq!(proof.proof_bytes().len(), CAPABILITY_PROOF_LENGTH);
    }

    #[test]
    fn depth_mismatch_rejected() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::setup(&mut rng);
        let (prover, _verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();

        let identity = Identity::random(&mut rng);
        let mut tree = MerkleTree::new(params, DEPTH + 1);
        let idx = tree.insert(identity.commitment(prover.params())).unwrap();
        let path = tree.path(idx).unwrap();

        assert!(prover
            .prove(&identity, &path, Fr::from(7u64), Fr::from(8u64))
            .is_err());
    }

    #[test]
    fn capability_roundtrip() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams::setup(&mut rng);
        let (prover, _verifier) = UniquenessProver::setup(&mut rng, params.clone(), DEPTH).unwrap();

        let identity = Identity::random(&mut rng);
        let mut tree = MerkleTree::new(params, DEPTH);
        let idx = tree.insert(identity.commitment(prover.params())).unwrap();
        let proof = prover
            .prove(&identity, &tree.path(idx).unwrap(), Fr::from(1u64), Fr::from(2u64))
            .unwrap();

        let restored = UniquenessProof::from_capability(&proof.to_capability()).unwrap();
        assert_eq!(restored, proof);
        assert!(restored.to_ark_proof().is_ok());
    }
}
