//! # Protocol Configuration & Constants
//!
//! Every magic number in NotABot lives here. The issuer (oracle) and the
//! verifier (adapters) both read from this module, which is the only way to
//! keep them bit-exact with each other. If a value here changes, every
//! outstanding attestation changes meaning with it.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate-independent protocol version, reported by `/health` and the CLI.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Attestation Parameters
// ---------------------------------------------------------------------------

/// How long an attestation stays admissible after issuance, in seconds.
///
/// Checked at verification time against the adapter's clock, never at
/// issuance time. There is no grace period beyond this window.
pub const VALIDITY_WINDOW_SECS: u64 = 3_600;

/// [`VALIDITY_WINDOW_SECS`] as a `Duration`, for callers that prefer one.
pub const VALIDITY_WINDOW: Duration = Duration::from_secs(VALIDITY_WINDOW_SECS);

/// Prefix mixed into every signed digest before the Ed25519 signature is
/// taken. Mirrors the "personal message" convention: a signature over an
/// attestation can never double as a signature over anything else.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19NotABot Signed Message:\n32";

/// Width of one ABI word in the proof wire format.
pub const WORD_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Account addresses are 20 bytes, rendered as `0x` + 40 hex chars.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Source Parameters
// ---------------------------------------------------------------------------

/// Minimum Gitcoin Passport score the oracle will sign and the adapter
/// will admit. Operators can override it on both sides.
pub const DEFAULT_GITCOIN_MIN_SCORE: u64 = 20;

/// Quality score recorded for sources that carry no score of their own.
pub const UNSCORED_QUALITY: u64 = 100;

/// Confidence ratios are expressed in basis points.
pub const CONFIDENCE_SCALE: u64 = 10_000;

/// Default confidence numerators, indexed by source id. The denominator is
/// always [`CONFIDENCE_SCALE`] at deployment; attack confirmations move the
/// numerator down from here.
pub const DEFAULT_CONFIDENCE_BPS: [u64; 4] = [
    9_500, // worldcoin
    8_000, // gitcoin
    7_000, // poh
    7_500, // brightid
];

/// Fixed-point denominator for human probabilities (1e18).
pub const PROBABILITY_SCALE: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

/// Reward token precision.
pub const REWARD_DECIMALS: u32 = 18;

/// Default amount credited per newly accepted source: 100 whole tokens.
pub const DEFAULT_REWARD_PER_SOURCE: u128 = 100 * 10u128.pow(REWARD_DECIMALS);

// ---------------------------------------------------------------------------
// Oracle Service
// ---------------------------------------------------------------------------

/// Default HTTP port for the oracle service.
pub const DEFAULT_ORACLE_PORT: u16 = 3001;

/// Timeout for one outbound provider call. The call fails when it fires;
/// nothing is retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Length of one rate-limit window.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Requests admitted per rate-limit window before the oracle answers 429.
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Upper bound on concurrently in-flight verification requests.
pub const MAX_IN_FLIGHT_REQUESTS: usize = 64;

/// Maximum accepted request body, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024;

// ---------------------------------------------------------------------------
// Uniqueness Proofs
// ---------------------------------------------------------------------------

/// Depth of the identity-commitment Merkle tree the capability proofs are
/// checked against. 2^16 members per group.
pub const MERKLE_TREE_DEPTH: usize = 16;

/// Default World ID action the capability adapter binds proofs to.
pub const DEFAULT_WORLD_ID_ACTION: &str = "verify-human";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_window_matches_duration() {
        assert_eq!(VALIDITY_WINDOW.as_secs(), VALIDITY_WINDOW_SECS);
        assert_eq!(VALIDITY_WINDOW_SECS, 3_600);
    }

    #[test]
    fn default_confidences_are_proper_fractions() {
        for bps in DEFAULT_CONFIDENCE_BPS {
            assert!(bps > 0 && bps < CONFIDENCE_SCALE);
        }
    }

    #[test]
    fn reward_is_whole_tokens() {
        assert_eq!(DEFAULT_REWARD_PER_SOURCE % 10u128.pow(REWARD_DECIMALS), 0);
        assert_eq!(DEFAULT_REWARD_PER_SOURCE / 10u128.pow(REWARD_DECIMALS), 100);
    }

    #[test]
    fn signed_prefix_declares_digest_length() {
        assert!(SIGNED_MESSAGE_PREFIX.ends_with(b"32"));
        assert_eq!(SIGNED_MESSAGE_PREFIX[0], 0x19);
    }
}
