//! # Hashing Utilities
//!
//! Two hash functions, each with a fixed job:
//!
//! - **SHA-256** — the canonical attestation digest and identity keys. Both
//!   sides of the protocol must produce these bit-for-bit, and SHA-256 is the
//!   one every client library already ships.
//! - **BLAKE3** — internal derivations that never leave the protocol:
//!   oracle/adapter addresses and hash-to-field for the uniqueness circuit.
//!
//! ## hash_to_field
//!
//! Maps arbitrary bytes to a BN254 scalar: BLAKE3, read little-endian,
//! reduce mod r. The bias is below 2^-128 since the digest is 256 bits
//! and the field is ~254 bits.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a `Vec<u8>`.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// SHA-256 of `data` as a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over several slices fed in order, without concatenating them
/// first. Same digest as hashing the concatenation.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// BLAKE3 of `data`.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Domain-separated BLAKE3 via `derive_key` mode. Different contexts never
/// collide, even over identical data.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Hash arbitrary data to a BN254 scalar field element.
///
/// ```
/// use notabot_protocol::crypto::hash::hash_to_field;
///
/// let a = hash_to_field(b"verify-human");
/// assert_eq!(a, hash_to_field(b"verify-human"));
/// ```
pub fn hash_to_field(data: &[u8]) -> Fr {
    let hash = blake3_hash(data);
    Fr::from_le_bytes_mod_order(&hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_sha256_array_matches_vec() {
        assert_eq!(sha256(b"notabot").as_slice(), sha256_array(b"notabot").as_slice());
    }

    #[test]
    fn test_sha256_multi_matches_concatenation() {
        let multi = sha256_multi(&[b"hello", b" ", b"world"]);
        assert_eq!(multi, sha256_array(b"hello world"));
    }

    #[test]
    fn blake3_deterministic() {
        assert_eq!(blake3_hash(b"oracle"), blake3_hash(b"oracle"));
        assert_ne!(blake3_hash(b"oracle"), blake3_hash(b"Oracle"));
    }

    #[test]
    fn test_domain_separation() {
        let data = b"same data";
        assert_ne!(
            domain_separated_hash("context-a", data),
            domain_separated_hash("context-b", data)
        );
        assert_ne!(domain_separated_hash("context-a", data), blake3_hash(data));
    }

    #[test]
    fn test_hash_to_field_deterministic() {
        assert_eq!(hash_to_field(b"signal"), hash_to_field(b"signal"));
        assert_ne!(hash_to_field(b"signal A"), hash_to_field(b"signal B"));
    }
}
