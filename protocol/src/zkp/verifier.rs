//! # Groth16 Proof Verification
//!
//! The capability adapter holds a [`UniquenessVerifier`] and checks every
//! submitted proof against the four public inputs. Three pairings and a
//! small MSM, independent of tree depth.

use anyhow::{Context, Result};
use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;

use super::circuit;
use super::prover::UniquenessProof;

/// Groth16 verification key for the uniqueness circuit.
///
/// Small, freely distributable, and cheap to clone.
#[derive(Clone)]
pub struct UniquenessVerifier {
    vk: VerifyingKey<Bn254>,
    depth: usize,
}

impl UniquenessVerifier {
    pub(crate) fn from_vk(vk: VerifyingKey<Bn254>, depth: usize) -> Self {
        Self { vk, depth }
    }

    /// Tree depth the key was generated for.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Verify a proof for a given subject signal and action scope.
    ///
    /// `Ok(false)` for a well-formed proof that doesn't check out; `Err`
    /// only for malformed points.
    pub fn verify(
        &self,
        proof: &UniquenessProof,
        signal_hash: Fr,
        external_nullifier: Fr,
    ) -> Result<bool> {
        let ark_proof = proof
            .to_ark_proof()
            .context("failed to deserialize proof")?;

        let inputs = circuit::public_inputs(
            proof.merkle_root,
            proof.nullifier_hash,
            signal_hash,
            external_nullifier,
        );

        let valid = Groth16::<Bn254>::verify(&self.vk, &inputs, &ark_proof)
            .context("Groth16 verification algorithm failed")?;
        Ok(valid)
    }

    /// Serialize the verification key (depth is stored alongside by the
    /// caller).
    pub fn vk_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.vk
            .serialize_compressed(&mut buf)
            .context("verification key serialization failed")?;
        Ok(buf)
    }

    pub fn vk_from_bytes(data: &[u8], depth: usize) -> Result<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(data)
            .context("failed to deserialize verification key")?;
        Ok(Self::from_vk(vk, depth))
    }
}

impl std::fmt::Debug for UniquenessVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniquenessVerifier")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
