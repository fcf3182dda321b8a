//! # Uniqueness Proof R1CS Circuit
//!
//! The statement being proved:
//!
//! ```text
//! "I know (secret, trapdoor, path) such that:
//!     1. leaf = secret * g + trapdoor * h          (identity commitment)
//!     2. fold(path, leaf) = merkle_root             (group membership)
//!     3. compress(secret, ext_nullifier) = nullifier_hash
//!     4. signal_hash is bound to this proof"
//! ```
//!
//! ## Constraint breakdown
//!
//! - Identity commitment: linear in the witness with constant generators,
//!   so it costs nothing beyond the allocations.
//! - Each tree level: two conditional selects (left/right ordering) plus one
//!   compression. Compression is a linear combination followed by x^5, i.e.
//!   three multiplication gates.
//! - Nullifier: one compression.
//! - Signal: one squaring. The signal has no relation to the witness; the
//!   gate exists so the public input is wired into the constraint system and
//!   the proof can't be replayed for a different subject.
//!
//! For depth 16 this is roughly 16 * 6 + 3 + 1 + 16 (boolean path bits)
//! constraints. Small.
//!
//! ## Public inputs (in order)
//!
//! | index | value |
//! |-------|-------|
//! | 0     | merkle_root |
//! | 1     | nullifier_hash |
//! | 2     | signal_hash |
//! | 3     | external_nullifier |

use ark_bn254::Fr;
use ark_r1cs_std::{
    alloc::AllocVar,
    boolean::Boolean,
    eq::EqGadget,
    fields::{fp::FpVar, FieldVar},
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use super::membership::{Identity, MembershipParams, MerklePath};

// ---------------------------------------------------------------------------
// Circuit definition
// ---------------------------------------------------------------------------

/// Groth16 circuit proving membership in a commitment tree plus a scoped
/// nullifier.
///
/// Witness and public slots are `Option<_>` so the same struct serves key
/// generation (all `None`) and proving.
#[derive(Clone)]
pub struct UniquenessCircuit {
    // -- Constants baked into the circuit -----------------------------------
    pub params: MembershipParams,
    pub depth: usize,

    // -- Private witness ----------------------------------------------------
    pub secret: Option<Fr>,
    pub trapdoor: Option<Fr>,
    pub siblings: Option<Vec<Fr>>,
    pub path_bits: Option<Vec<bool>>,

    // -- Public inputs ------------------------------------------------------
    pub merkle_root: Option<Fr>,
    pub nullifier_hash: Option<Fr>,
    pub signal_hash: Option<Fr>,
    pub external_nullifier: Option<Fr>,
}

impl UniquenessCircuit {
    /// Fully populated circuit for proof generation. The root and nullifier
    /// are computed from the witness, so an honest prover always satisfies
    /// constraints 2 and 3.
    pub fn new(
        params: &MembershipParams,
        identity: &Identity,
        path: &MerklePath,
        signal_hash: Fr,
        external_nullifier: Fr,
    ) -> Self {
        let leaf = identity.commitment(params);
        Self {
            params: params.clone(),
            depth: path.depth(),
            secret: Some(identity.secret),
            trapdoor: Some(identity.trapdoor),
            siblings: Some(path.siblings.clone()),
            path_bits: Some(path.path_bits.clone()),
            merkle_root: Some(path.root(params, leaf)),
            nullifier_hash: Some(identity.nullifier_hash(params, external_nullifier)),
            signal_hash: Some(signal_hash),
            external_nullifier: Some(external_nullifier),
        }
    }

    /// Blank circuit for CRS generation. Same topology, empty slots.
    pub fn blank(params: &MembershipParams, depth: usize) -> Self {
        Self {
            params: params.clone(),
            depth,
            secret: None,
            trapdoor: None,
            siblings: None,
            path_bits: None,
            merkle_root: None,
            nullifier_hash: None,
            signal_hash: None,
            external_nullifier: None,
        }
    }

    /// Override the claimed public root. Used to check that a prover can't
    /// claim membership in a tree it isn't in.
    pub fn with_merkle_root(mut self, root: Fr) -> Self {
        self.merkle_root = Some(root);
        self
    }
}

// ---------------------------------------------------------------------------
// Gadgets
// ---------------------------------------------------------------------------

/// In-circuit `(l * g + r * h + c)^5`.
fn compress_var(
    params: &MembershipParams,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let x = left * params.g + right * params.h + params.c;
    let x2 = x.square()?;
    let x4 = x2.square()?;
    Ok(x4 * &x)
}

// ---------------------------------------------------------------------------
// Constraint synthesizer
// ---------------------------------------------------------------------------

impl ConstraintSynthesizer<Fr> for UniquenessCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // ===================================================================
        // 1. Public inputs, in the order public_inputs() returns them
        // ===================================================================

        let root_var = FpVar::<Fr>::new_input(ark_relations::ns!(cs, "merkle_root"), || {
            self.merkle_root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_var =
            FpVar::<Fr>::new_input(ark_relations::ns!(cs, "nullifier_hash"), || {
                self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
            })?;
        let signal_var = FpVar::<Fr>::new_input(ark_relations::ns!(cs, "signal_hash"), || {
            self.signal_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let ext_nullifier_var =
            FpVar::<Fr>::new_input(ark_relations::ns!(cs, "external_nullifier"), || {
                self.external_nullifier
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;

        // ===================================================================
        // 2. Private witnesses
        // ===================================================================

        let secret_var = FpVar::<Fr>::new_witness(ark_relations::ns!(cs, "secret"), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let trapdoor_var = FpVar::<Fr>::new_witness(ark_relations::ns!(cs, "trapdoor"), || {
            self.trapdoor.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // ===================================================================
        // 3. Identity commitment
        // ===================================================================

        let mut node = &secret_var * self.params.g + &trapdoor_var * self.params.h;

        // ===================================================================
        // 4. Membership: fold the path up to the root
        // ===================================================================

        for level in 0..self.depth {
            let sibling = FpVar::<Fr>::new_witness(ark_relations::ns!(cs, "sibling"), || {
                self.siblings
                    .as_ref()
                    .and_then(|s| s.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;
            let is_right = Boolean::<Fr>::new_witness(ark_relations::ns!(cs, "path_bit"), || {
                self.path_bits
                    .as_ref()
                    .and_then(|b| b.get(level).copied())
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;

            let left = is_right.select(&sibling, &node)?;
            let right = is_right.select(&node, &sibling)?;
            node = compress_var(&self.params, &left, &right)?;
        }

        node.enforce_equal(&root_var)?;

        // ===================================================================
        // 5. Nullifier
        // ===================================================================

        let computed_nullifier = compress_var(&self.params, &secret_var, &ext_nullifier_var)?;
        computed_nullifier.enforce_equal(&nullifier_var)?;

        // ===================================================================
        // 6. Signal binding
        // ===================================================================

        let _signal_sq = signal_var.square()?;

        Ok(())
    }
}

/// Public input vector in allocation order.
pub fn public_inputs(
    merkle_root: Fr,
    nullifier_hash: Fr,
    signal_hash: Fr,
    external_nullifier: Fr,
) -> Vec<Fr> {
    vec![merkle_root, nullifier_hash, signal_hash, external_nullifier]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
