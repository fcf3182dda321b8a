//! # Contract Errors
//!
//! One closed enum for every rejection the ledger, the adapters and the
//! reward credentials can produce. Each variant maps to a stable
//! machine-readable code via [`ContractError::code`], so client code can
//! branch without string matching.

use notabot_protocol::Source;
use serde::Serialize;
use thiserror::Error;

/// Broad class of a rejection. Determines whether retrying makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed address or proof. Rejected before any state is read.
    Input,
    /// Signature or capability proof failed. Always checked first.
    Authentication,
    /// Outside the validity window. No grace period.
    Freshness,
    /// Business rule: score under the source minimum.
    Threshold,
    /// Proof or identity already consumed. Permanent.
    Replay,
    /// Caller lacks the role. Configuration problem, not user-recoverable.
    Authorization,
    /// Credential bookkeeping (balances, transfers).
    Credential,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    // -- Input -------------------------------------------------------------
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("invalid address")]
    InvalidAddress,

    #[error("invalid confidence {numerator}/{denominator}")]
    InvalidConfidence { numerator: u64, denominator: u64 },

    #[error("source {0} is not handled by this adapter family")]
    UnsupportedSource(Source),

    #[error("no adapter installed for source {0}")]
    AdapterNotInstalled(Source),

    // -- Authentication ----------------------------------------------------
    #[error("signature does not match the configured oracle")]
    InvalidSignature,

    #[error("uniqueness proof did not verify")]
    InvalidProof,

    #[error("merkle root is not the pinned group root")]
    UnknownMerkleRoot,

    // -- Freshness ---------------------------------------------------------
    #[error("proof issued at {issued_at} expired before {now}")]
    ProofExpired { issued_at: u64, now: u64 },

    // -- Threshold ---------------------------------------------------------
    #[error("score {score} is below the minimum of {min_score}")]
    ScoreTooLow { score: u64, min_score: u64 },

    // -- Replay ------------------------------------------------------------
    #[error("proof already used")]
    ProofAlreadyUsed,

    #[error("identity key already recorded")]
    DuplicateVerification,

    #[error("subject already verified with {0}")]
    AlreadyVerified(Source),

    // -- Authorization -----------------------------------------------------
    #[error("caller is not the adapter for {0}")]
    UnauthorizedAdapter(Source),

    #[error("caller is not authorized for this administrative action")]
    UnauthorizedAdmin,

    #[error("caller is not an authorized minter")]
    UnauthorizedMinter,

    #[error("address is not a registered adapter")]
    UnknownAdapter,

    // -- Credentials -------------------------------------------------------
    #[error("insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: u128, amount: u128 },

    #[error("balance overflow")]
    BalanceOverflow,

    #[error("verification badges are not transferable")]
    TransferNotAllowed,
}

impl ContractError {
    /// Stable public code.
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::MalformedProof(_) => "MALFORMED_PROOF",
            ContractError::InvalidAddress => "INVALID_ADDRESS",
            ContractError::InvalidConfidence { .. } => "INVALID_CONFIDENCE",
            ContractError::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
            ContractError::AdapterNotInstalled(_) => "ADAPTER_NOT_INSTALLED",
            ContractError::InvalidSignature => "INVALID_SIGNATURE",
            ContractError::InvalidProof => "INVALID_PROOF",
            ContractError::UnknownMerkleRoot => "UNKNOWN_MERKLE_ROOT",
            ContractError::ProofExpired { .. } => "PROOF_EXPIRED",
            ContractError::ScoreTooLow { .. } => "SCORE_TOO_LOW",
            ContractError::ProofAlreadyUsed => "PROOF_ALREADY_USED",
            ContractError::DuplicateVerification => "DUPLICATE_VERIFICATION",
            ContractError::AlreadyVerified(_) => "ALREADY_VERIFIED",
            ContractError::UnauthorizedAdapter(_) => "UNAUTHORIZED_ADAPTER",
            ContractError::UnauthorizedAdmin => "UNAUTHORIZED_ADMIN",
            ContractError::UnauthorizedMinter => "UNAUTHORIZED_MINTER",
            ContractError::UnknownAdapter => "UNKNOWN_ADAPTER",
            ContractError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            ContractError::BalanceOverflow => "BALANCE_OVERFLOW",
            ContractError::TransferNotAllowed => "TRANSFER_NOT_ALLOWED",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::MalformedProof(_)
            | ContractError::InvalidAddress
            | ContractError::InvalidConfidence { .. }
            | ContractError::UnsupportedSource(_)
            | ContractError::AdapterNotInstalled(_) => ErrorCategory::Input,
            ContractError::InvalidSignature
            | ContractError::InvalidProof
            | ContractError::UnknownMerkleRoot => ErrorCategory::Authentication,
            ContractError::ProofExpired { .. } => ErrorCategory::Freshness,
            ContractError::ScoreTooLow { .. } => ErrorCategory::Threshold,
            ContractError::ProofAlreadyUsed
            | ContractError::DuplicateVerification
            | ContractError::AlreadyVerified(_) => ErrorCategory::Replay,
            ContractError::UnauthorizedAdapter(_)
            | ContractError::UnauthorizedAdmin
            | ContractError::UnauthorizedMinter
            | ContractError::UnknownAdapter => ErrorCategory::Authorization,
            ContractError::InsufficientBalance { .. }
            | ContractError::BalanceOverflow
            | ContractError::TransferNotAllowed => ErrorCategory::Credential,
        }
    }
}
