//! # Confidence Math
//!
//! Each source carries a confidence ratio `numerator / denominator`: the
//! estimated probability that an account it verified is a real, unique
//! human. A subject verified by several independent sources is a bot only
//! if every one of them was fooled:
//!
//! ```text
//! P(human) = 1 - Π (1 - p_i)
//! ```
//!
//! All arithmetic is integer fixed point with denominator
//! [`PROBABILITY_SCALE`] (1e18). The running complement is floored after
//! every factor, which keeps the result monotonic: adding a source can
//! never lower the probability.
//!
//! Attack feedback is the pure transition [`penalize`]: a confirmed attack
//! halves the source's numerator.

use notabot_protocol::config::{CONFIDENCE_SCALE, PROBABILITY_SCALE};
use notabot_protocol::Source;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ContractError;

/// A proper fraction `numerator / denominator`, `0 < denominator`,
/// `numerator <= denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfidence")]
pub struct Confidence {
    numerator: u64,
    denominator: u64,
}

/// Unchecked wire form; every decoded ratio goes through [`Confidence::new`].
#[derive(Deserialize)]
struct RawConfidence {
    numerator: u64,
    denominator: u64,
}

impl TryFrom<RawConfidence> for Confidence {
    type Error = ContractError;

    fn try_from(raw: RawConfidence) -> Result<Self, Self::Error> {
        Confidence::new(raw.numerator, raw.denominator)
    }
}

impl Confidence {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ContractError> {
        if denominator == 0 || numerator > denominator {
            return Err(ContractError::InvalidConfidence {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Deployment default for a source, in basis points.
    pub fn default_for(source: Source) -> Self {
        Self {
            numerator: source.default_confidence_bps(),
            denominator: CONFIDENCE_SCALE,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Confidence after one confirmed attack: numerator halved (floor),
/// denominator unchanged.
pub fn penalize(confidence: Confidence) -> Confidence {
    Confidence {
        numerator: confidence.numerator / 2,
        denominator: confidence.denominator,
    }
}

/// Fixed-point probability in `[0, PROBABILITY_SCALE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Probability(u128);

impl Probability {
    pub const ZERO: Probability = Probability(0);
    pub const ONE: Probability = Probability(PROBABILITY_SCALE);

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Lossy, for display and logging only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / PROBABILITY_SCALE as f64
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_f64())
    }
}

/// `1 - Π(1 - p_i)` over the given confidences.
///
/// Empty input is probability zero.
pub fn human_probability<I>(confidences: I) -> Probability
where
    I: IntoIterator<Item = Confidence>,
{
    let mut complement = PROBABILITY_SCALE;
    for c in confidences {
        let miss = (c.denominator - c.numerator) as u128;
        // complement <= 1e18 and miss <= u64::MAX, so the product fits in u128.
        complement = complement * miss / c.denominator as u128;
    }
    Probability(PROBABILITY_SCALE - complement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bps(n: u64) -> Confidence {
        Confidence::new(n, 10_000).unwrap()
    }

    #[test]
    fn rejects_improper_fractions() {
        assert!(Confidence::new(1, 0).is_err());
        assert!(Confidence::new(11, 10).is_err());
        assert!(Confidence::new(0, 10).is_ok());
        assert!(Confidence::new(10, 10).is_ok());
    }

    #[test]
    fn single_source_is_its_confidence() {
        let p = human_probability([bps(8_000)]);
        assert_eq!(p.raw(), 800_000_000_000_000_000);
    }

    #[test]
    fn two_sources_combine() {
        // 1 - (0.2 * 0.3) = 0.94
        let p = human_probability([bps(8_000), bps(7_000)]);
        assert_eq!(p.raw(), 940_000_000_000_000_000);
    }

    #[test]
    fn all_four_defaults() {
        let p = human_probability(Source::ALL.map(Confidence::default_for));
        // 1 - 0.05 * 0.2 * 0.3 * 0.25 = 0.99925
        assert_eq!(p.raw(), 999_250_000_000_000_000);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(human_probability([]), Probability::ZERO);
    }

    #[test]
    fn adding_sources_never_decreases() {
        let odd = Confidence::new(1, 3).unwrap();
        let mut prev = Probability::ZERO;
        let mut set = Vec::new();
        for c in [odd, bps(9_999), odd, bps(1), odd] {
            set.push(c);
            let p = human_probability(set.clone());
            assert!(p >= prev);
            prev = p;
        }
        assert!(prev <= Probability::ONE);
    }

    #[test]
    fn penalize_halves_numerator() {
        let c = penalize(bps(8_000));
        assert_eq!(c.numerator(), 4_000);
        assert_eq!(c.denominator(), 10_000);
        assert_eq!(penalize(Confidence::new(1, 2).unwrap()).numerator(), 0);
    }

    #[test]
    fn penalized_source_lowers_probability() {
        let before = human_probability([bps(8_000)]);
        let after = human_probability([penalize(bps(8_000))]);
        assert!(after < before);
    }

    #[test]
    fn decoding_enforces_proper_fraction() {
        let ok: Confidence = serde_json::from_str(r#"{"numerator":7,"denominator":10}"#).unwrap();
        assert_eq!(ok, Confidence::new(7, 10).unwrap());
        assert!(serde_json::from_str::<Confidence>(r#"{"numerator":5,"denominator":0}"#).is_err());
        assert!(serde_json::from_str::<Confidence>(r#"{"numerator":7,"denominator":3}"#).is_err());

        let json = serde_json::to_string(&bps(2_500)).unwrap();
        assert_eq!(serde_json::from_str::<Confidence>(&json).unwrap(), bps(2_500));
    }
}
