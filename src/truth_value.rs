//! Probabilistic truth values attached to every atom.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Structural equality tolerance used by `PartialEq`/ordering on `TruthValue`.
/// Two truth values that differ by less than this are considered equal, which
/// keeps rule-purity checks (P5) robust to floating point noise.
const EPSILON: f64 = 1e-9;

/// An immutable `(strength, confidence)` pair, both clamped to `[0, 1]`.
///
/// The default truth value `(1.0, 0.0)` is the *vacuous* tv: maximal strength,
/// zero confidence. It is what an atom gets when no evidence has been supplied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TruthValue {
    strength: f64,
    confidence: f64,
}

impl TruthValue {
    pub const VACUOUS: TruthValue = TruthValue {
        strength: 1.0,
        confidence: 0.0,
    };

    /// Builds a truth value, clamping both fields to `[0, 1]` and replacing
    /// NaN with the vacuous tv's corresponding field, per the core's numeric
    /// error-handling contract.
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: clamp_or_vacuous(strength, Self::VACUOUS.strength),
            confidence: clamp_or_vacuous(confidence, Self::VACUOUS.confidence),
        }
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Probabilistic conjunction: `(min(s_a,s_b), min(c_a,c_b))`.
    pub fn and(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            self.strength.min(other.strength),
            self.confidence.min(other.confidence),
        )
    }

    /// Probabilistic disjunction: `(max(s_a,s_b), min(c_a,c_b))`.
    pub fn or(&self, other: &TruthValue) -> TruthValue {
        TruthValue::new(
            self.strength.max(other.strength),
            self.confidence.min(other.confidence),
        )
    }

    /// Probabilistic negation: `(1 - s, c)`.
    pub fn not(&self) -> TruthValue {
        TruthValue::new(1.0 - self.strength, self.confidence)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::VACUOUS
    }
}

impl PartialEq for TruthValue {
    fn eq(&self, other: &Self) -> bool {
        (self.strength - other.strength).abs() < EPSILON
            && (self.confidence - other.confidence).abs() < EPSILON
    }
}

impl PartialOrd for TruthValue {
    /// Structural ordering: by strength, then confidence. Primarily useful
    /// for deterministic sorting in tests and BIT tie-breaking.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.strength.partial_cmp(&other.strength) {
            Some(Ordering::Equal) | None => self.confidence.partial_cmp(&other.confidence),
            ord => ord,
        }
    }
}

fn clamp_or_vacuous(x: f64, vacuous: f64) -> f64 {
    if x.is_nan() {
        vacuous
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_vacuous() {
        let tv = TruthValue::default();
        assert_eq!(tv.strength(), 1.0);
        assert_eq!(tv.confidence(), 0.0);
    }

    #[test]
    fn clamps_out_of_range_and_nan() {
        let tv = TruthValue::new(1.5, -0.5);
        assert_eq!(tv.strength(), 1.0);
        assert_eq!(tv.confidence(), 0.0);

        let tv = TruthValue::new(f64::NAN, 0.5);
        assert_eq!(tv.strength(), 1.0);
        assert_eq!(tv.confidence(), 0.5);
    }

    #[test]
    fn and_or_not_algebra() {
        let a = TruthValue::new(0.8, 0.9);
        let b = TruthValue::new(0.6, 0.95);
        assert_eq!(a.and(&b), TruthValue::new(0.6, 0.9));
        assert_eq!(a.or(&b), TruthValue::new(0.8, 0.9));
        assert_eq!(a.not(), TruthValue::new(0.2, 0.9));
    }

    #[test]
    fn and_is_idempotent_not_is_involutive_in_strength() {
        let tv = TruthValue::new(0.42, 0.7);
        assert_eq!(tv.and(&tv), tv);
        let double_not = tv.not().not();
        assert_eq!(double_not.strength(), tv.strength());
        assert!(double_not.confidence() <= tv.confidence() + EPSILON);
    }
}
