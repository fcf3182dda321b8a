//! # Group Membership Primitives
//!
//! The native (out-of-circuit) half of the uniqueness proof. Everything here
//! is plain BN254 scalar-field arithmetic; the circuit re-derives exactly the
//! same values in R1CS.
//!
//! ```text
//! identity commitment   leaf = secret * g + trapdoor * h
//! node compression      compress(l, r) = (l * g + r * h + c)^5
//! nullifier hash        nullifier = compress(secret, external_nullifier)
//! ```
//!
//! `g`, `h`, `c` are fixed scalar parameters with no known relation between
//! them. The commitment is the scalar Pedersen form; compression adds a round
//! constant and the x^5 S-box so that two-to-one hashing is non-linear and
//! cheap in constraints (three multiplications per node).
//!
//! ## Domain values
//!
//! - `signal_hash` = `hash_to_field(subject address bytes)`: binds a proof
//!   to the account submitting it.
//! - `external_nullifier` = `hash_to_field(H(app_id) || action)`: scopes the
//!   nullifier so one identity gets one nullifier per action.

use ark_bn254::Fr;
use ark_ff::{Field, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::Rng;
use thiserror::Error;

use crate::crypto::hash::hash_to_field;
use crate::identity::Address;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("merkle tree is full ({0} leaves)")]
    TreeFull(usize),

    #[error("leaf index {0} out of range")]
    UnknownLeaf(usize),
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Scalar parameters shared by prover, verifier and tree.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct MembershipParams {
    pub g: Fr,
    pub h: Fr,
    pub c: Fr,
}

impl MembershipParams {
    /// Fresh random parameters. For local ceremonies and tests.
    pub fn setup<R: Rng>(rng: &mut R) -> Self {
        Self {
            g: Fr::rand(rng),
            h: Fr::rand(rng),
            c: Fr::rand(rng),
        }
    }

    /// Nothing-up-my-sleeve parameters derived from fixed labels. Every
    /// party can reproduce them without exchanging anything.
    pub fn standard() -> Self {
        Self {
            g: hash_to_field(b"notabot.membership.g"),
            h: hash_to_field(b"notabot.membership.h"),
            c: hash_to_field(b"notabot.membership.c"),
        }
    }

    /// Two-to-one compression used for tree nodes and nullifiers.
    pub fn compress(&self, left: Fr, right: Fr) -> Fr {
        let x = left * self.g + right * self.h + self.c;
        x.pow([5u64])
    }

    pub fn identity_commitment(&self, secret: Fr, trapdoor: Fr) -> Fr {
        secret * self.g + trapdoor * self.h
    }

    pub fn nullifier_hash(&self, secret: Fr, external_nullifier: Fr) -> Fr {
        self.compress(secret, external_nullifier)
    }
}

/// Field element a proof is bound to for `subject`.
pub fn signal_hash(subject: &Address) -> Fr {
    hash_to_field(subject.as_bytes())
}

/// Scope of a nullifier: one per `(app_id, action)`. The app id is hashed
/// on its own first so no split of the concatenated strings can collide.
pub fn external_nullifier(app_id: &str, action: &str) -> Fr {
    let mut preimage = Vec::with_capacity(32 + action.len());
    preimage.extend_from_slice(&fr_to_bytes(&hash_to_field(app_id.as_bytes())));
    preimage.extend_from_slice(action.as_bytes());
    hash_to_field(&preimage)
}

// ---------------------------------------------------------------------------
// Field encoding
// ---------------------------------------------------------------------------

/// Canonical 32-byte little-endian encoding of a field element.
pub fn fr_to_bytes(value: &Fr) -> [u8; 32] {
    let mut out = [0u8; 32];
    // A 32-byte buffer always fits a compressed Fr, so the write cannot fail.
    let _ = value.serialize_compressed(&mut out[..]);
    out
}

/// Inverse of [`fr_to_bytes`]. Non-canonical encodings (>= r) are rejected.
pub fn fr_from_bytes(bytes: &[u8; 32]) -> Option<Fr> {
    Fr::deserialize_compressed(&bytes[..]).ok()
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A prover-side identity. Never leaves the holder's device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub secret: Fr,
    pub trapdoor: Fr,
}

impl Identity {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            secret: Fr::rand(rng),
            trapdoor: Fr::rand(rng),
        }
    }

    pub fn commitment(&self, params: &MembershipParams) -> Fr {
        params.identity_commitment(self.secret, self.trapdoor)
    }

    pub fn nullifier_hash(&self, params: &MembershipParams, external_nullifier: Fr) -> Fr {
        params.nullifier_hash(self.secret, external_nullifier)
    }
}

// ---------------------------------------------------------------------------
// Merkle tree
// ---------------------------------------------------------------------------

/// Authentication path from a leaf to the root.
///
/// `path_bits[i]` is `true` when the running node is the *right* child at
/// level `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub siblings: Vec<Fr>,
    pub path_bits: Vec<bool>,
}

impl MerklePath {
    /// Fold the path over `leaf` and return the implied root.
    pub fn root(&self, params: &MembershipParams, leaf: Fr) -> Fr {
        self.siblings
            .iter()
            .zip(&self.path_bits)
            .fold(leaf, |node, (sibling, is_right)| {
                if *is_right {
                    params.compress(*sibling, node)
                } else {
                    params.compress(node, *sibling)
                }
            })
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

/// Fixed-depth, append-only commitment tree. Empty slots hold the zero
/// subtree for their level.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    params: MembershipParams,
    depth: usize,
    zeros: Vec<Fr>,
    layers: Vec<Vec<Fr>>,
}

impl MerkleTree {
    pub fn new(params: MembershipParams, depth: usize) -> Self {
        let mut zeros = Vec::with_capacity(depth + 1);
        zeros.push(Fr::zero());
        for level in 0..depth {
            let z = zeros[level];
            zeros.push(params.compress(z, z));
        }
        Self {
            params,
            depth,
            zeros,
            layers: vec![Vec::new(); depth + 1],
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    fn node(&self, level: usize, index: usize) -> Fr {
        self.layers[level]
            .get(index)
            .copied()
            .unwrap_or(self.zeros[level])
    }

    /// Append a leaf, returning its index.
    pub fn insert(&mut self, leaf: Fr) -> Result<usize, MembershipError> {
        let capacity = 1usize << self.depth;
        let index = self.layers[0].len();
        if index >= capacity {
            return Err(MembershipError::TreeFull(capacity));
        }
        self.layers[0].push(leaf);

        let mut i = index;
        for level in 0..self.depth {
            let parent = i / 2;
            let hash = self
                .params
                .compress(self.node(level, parent * 2), self.node(level, parent * 2 + 1));
            let upper = &mut self.layers[level + 1];
            if parent < upper.len() {
                upper[parent] = hash;
            } else {
                upper.push(hash);
            }
            i = parent;
        }
        Ok(index)
    }

    pub fn root(&self) -> Fr {
        self.node(self.depth, 0)
    }

    pub fn path(&self, index: usize) -> Result<MerklePath, MembershipError> {
        if index >= self.len() {
            return Err(MembershipError::UnknownLeaf(index));
        }
        let mut siblings = Vec::with_capacity(self.depth);
        let mut path_bits = Vec::with_capacity(self.depth);
        let mut i = index;
        for level in 0..self.depth {
            siblings.push(self.node(level, i ^ 1));
            path_bits.push(i & 1 == 1);
            i /= 2;
        }
        Ok(MerklePath {
            siblings,
            path_bits,
        })
    }
}
