//! # Verification Sources
//!
//! The closed set of identity providers NotABot aggregates. Ids are stable
//! and appear on the wire and in ledger state; never renumber them.
//!
//! | id | name        | family     |
//! |----|-------------|------------|
//! | 0  | `worldcoin` | capability |
//! | 1  | `gitcoin`   | scored     |
//! | 2  | `poh`       | unscored   |
//! | 3  | `brightid`  | unscored   |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{DEFAULT_CONFIDENCE_BPS, DEFAULT_GITCOIN_MIN_SCORE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("unknown source: {0}")]
    UnknownName(String),

    #[error("unknown source id: {0}")]
    UnknownId(u8),
}

/// How a source's proofs are shaped and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFamily {
    /// Oracle-signed attestation carrying a score.
    Scored,
    /// Oracle-signed attestation, no score.
    Unscored,
    /// Self-contained zero-knowledge uniqueness proof. No oracle involved.
    Capability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Worldcoin,
    Gitcoin,
    Poh,
    #[serde(rename = "brightid")]
    BrightId,
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Worldcoin, Source::Gitcoin, Source::Poh, Source::BrightId];

    pub const fn id(self) -> u8 {
        match self {
            Source::Worldcoin => 0,
            Source::Gitcoin => 1,
            Source::Poh => 2,
            Source::BrightId => 3,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, SourceError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(SourceError::UnknownId(id))
    }

    /// Lowercase name used in URLs and identity-key preimages.
    pub const fn name(self) -> &'static str {
        match self {
            Source::Worldcoin => "worldcoin",
            Source::Gitcoin => "gitcoin",
            Source::Poh => "poh",
            Source::BrightId => "brightid",
        }
    }

    pub const fn family(self) -> SourceFamily {
        match self {
            Source::Worldcoin => SourceFamily::Capability,
            Source::Gitcoin => SourceFamily::Scored,
            Source::Poh | Source::BrightId => SourceFamily::Unscored,
        }
    }

    /// Whether attestations for this source carry a score word.
    pub const fn is_scored(self) -> bool {
        matches!(self.family(), SourceFamily::Scored)
    }

    /// Minimum score at deployment. Zero means "no threshold".
    pub const fn default_min_score(self) -> u64 {
        match self {
            Source::Gitcoin => DEFAULT_GITCOIN_MIN_SCORE,
            _ => 0,
        }
    }

    /// Confidence numerator in basis points at deployment.
    pub const fn default_confidence_bps(self) -> u64 {
        DEFAULT_CONFIDENCE_BPS[self.id() as usize]
    }
}

impl FromStr for Source {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SourceError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable() {
        for (i, src) in Source::ALL.iter().enumerate() {
            assert_eq!(src.id() as usize, i);
            assert_eq!(Source::from_id(i as u8).unwrap(), *src);
        }
        assert_eq!(Source::from_id(4), Err(SourceError::UnknownId(4)));
    }

    #[test]
    fn names_roundtrip() {
        for src in Source::ALL {
            assert_eq!(src.name().parse::<Source>().unwrap(), src);
        }
        assert!("twitter".parse::<Source>().is_err());
    }

    #[test]
    fn families() {
        assert!(Source::Gitcoin.is_scored());
        assert!(!Source::Poh.is_scored());
        assert!(!Source::BrightId.is_scored());
        assert_eq!(Source::Worldcoin.family(), SourceFamily::Capability);
    }

    #[test]
    fn defaults() {
        assert_eq!(Source::Gitcoin.default_min_score(), 20);
        assert_eq!(Source::Poh.default_min_score(), 0);
        assert_eq!(Source::Worldcoin.default_confidence_bps(), 9_500);
        assert_eq!(Source::BrightId.default_confidence_bps(), 7_500);
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&Source::BrightId).unwrap(), "\"brightid\"");
        assert_eq!(serde_json::to_string(&Source::Poh).unwrap(), "\"poh\"");
    }
}
