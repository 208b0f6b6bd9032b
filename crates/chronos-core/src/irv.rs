// crates/chronos-core/src/irv.rs
//
// Reputation-evidence vector (IRV): the fixed five-component projection of a
// fused mass function that the dynamics layer consumes.

use serde::{Deserialize, Serialize};

use crate::frame::{Hypothesis, Label};
use crate::mass::MassFunction;

/// Five evidence scalars, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Irv {
    /// Bel({trusted}).
    pub belief_trusted: f64,
    /// Bel({untrusted}).
    pub belief_untrusted: f64,
    /// Bel({unknown}).
    pub belief_unknown: f64,
    /// Pl({trusted}).
    pub plausibility_trusted: f64,
    /// BetP(trusted).
    pub pignistic_trusted: f64,
}

impl Irv {
    /// The all-zero vector returned for an empty credential set.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Project a mass function into the evidence vector, clipping each
    /// component to [0, 1].
    pub fn from_mass(m: &MassFunction) -> Self {
        Self {
            belief_trusted: m.belief(Hypothesis::TRUSTED).clamp(0.0, 1.0),
            belief_untrusted: m.belief(Hypothesis::UNTRUSTED).clamp(0.0, 1.0),
            belief_unknown: m.belief(Hypothesis::UNKNOWN).clamp(0.0, 1.0),
            plausibility_trusted: m.plausibility(Hypothesis::TRUSTED).clamp(0.0, 1.0),
            pignistic_trusted: m.pignistic_of(Label::Trusted).clamp(0.0, 1.0),
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.belief_trusted,
            self.belief_untrusted,
            self.belief_unknown,
            self.plausibility_trusted,
            self.pignistic_trusted,
        ]
    }

    /// True when every component lies in [0, 1].
    pub fn is_bounded(&self) -> bool {
        self.as_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_is_bounded() {
        assert_eq!(Irv::zero().as_array(), [0.0; 5]);
        assert!(Irv::zero().is_bounded());
    }

    #[test]
    fn vacuous_mass_projects_to_ignorance() {
        let irv = Irv::from_mass(&MassFunction::vacuous());
        assert_eq!(irv.belief_trusted, 0.0);
        assert_eq!(irv.plausibility_trusted, 1.0);
        assert!((irv.pignistic_trusted - 1.0 / 3.0).abs() < 1e-12);
    }
}
