// crates/chronos-core/src/mass.rs
//
// Mass functions (basic belief assignments) over the hypothesis lattice.
//
// A mass function assigns a non-negative weight to each of the seven
// non-empty hypotheses, with weights summing to 1.0. Storage is a fixed
// array indexed by hypothesis bit mask; slot 0 (the empty set) is always 0.

use serde::{Deserialize, Serialize};

use crate::error::ChronosError;
use crate::frame::{Hypothesis, Label, LATTICE};

/// Tolerance used when checking that masses sum to 1.0.
pub const MASS_TOLERANCE: f64 = 1e-9;

/// A normalized basic belief assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(Hypothesis, f64)>", into = "Vec<(Hypothesis, f64)>")]
pub struct MassFunction {
    masses: [f64; 8],
}

impl MassFunction {
    /// Total ignorance: all mass on the full frame.
    pub fn vacuous() -> Self {
        Self::certain(Hypothesis::FRAME)
    }

    /// All mass on a single hypothesis.
    pub fn certain(hypothesis: Hypothesis) -> Self {
        let mut masses = [0.0; 8];
        masses[hypothesis.bits() as usize] = 1.0;
        Self { masses }
    }

    /// Build a mass function from focal elements, normalizing by the total.
    ///
    /// Repeated hypotheses accumulate. Returns an error if any weight is
    /// negative or non-finite, or if the total is zero.
    pub fn from_focal<I>(focal: I) -> Result<Self, ChronosError>
    where
        I: IntoIterator<Item = (Hypothesis, f64)>,
    {
        let mut masses = [0.0; 8];
        for (h, m) in focal {
            if !m.is_finite() || m < 0.0 {
                return Err(ChronosError::InvalidParameter(format!(
                    "mass on {h} must be finite and non-negative, got {m}"
                )));
            }
            masses[h.bits() as usize] += m;
        }
        let total: f64 = masses.iter().sum();
        if total <= 0.0 {
            return Err(ChronosError::InvalidParameter(
                "mass function has zero total mass".to_string(),
            ));
        }
        for m in masses.iter_mut() {
            *m /= total;
        }
        Ok(Self { masses })
    }

    /// Mass assigned to exactly this hypothesis.
    pub fn mass(&self, hypothesis: Hypothesis) -> f64 {
        self.masses[hypothesis.bits() as usize]
    }

    /// Hypotheses carrying strictly positive mass, in lattice order.
    pub fn focal_elements(&self) -> impl Iterator<Item = (Hypothesis, f64)> + '_ {
        LATTICE
            .iter()
            .map(move |&h| (h, self.mass(h)))
            .filter(|&(_, m)| m > 0.0)
    }

    /// Sum of all masses. Equals 1.0 within [`MASS_TOLERANCE`].
    pub fn total(&self) -> f64 {
        self.masses.iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= MASS_TOLERANCE
    }

    /// Belief: total mass of hypotheses that are subsets of `hypothesis`.
    pub fn belief(&self, hypothesis: Hypothesis) -> f64 {
        self.focal_elements()
            .filter(|(a, _)| a.is_subset_of(hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// Plausibility: total mass of hypotheses that intersect `hypothesis`.
    pub fn plausibility(&self, hypothesis: Hypothesis) -> f64 {
        self.focal_elements()
            .filter(|(a, _)| a.intersects(hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// Pignistic probability distribution, indexed by [`Label::index`].
    ///
    /// Each focal element shares its mass equally among its labels.
    pub fn pignistic(&self) -> [f64; 3] {
        let mut betp = [0.0; 3];
        for (a, m) in self.focal_elements() {
            let share = m / a.cardinality() as f64;
            for label in a.labels() {
                betp[label.index()] += share;
            }
        }
        betp
    }

    /// Pignistic probability of a single label.
    pub fn pignistic_of(&self, label: Label) -> f64 {
        self.pignistic()[label.index()]
    }

    /// Belief entropy: -sum m(A) * log2(m(A) / (2^|A| - 1)).
    ///
    /// Larger focal elements contribute more, so diffuse evidence scores
    /// higher than a confident Bayesian assignment of the same spread.
    pub fn belief_entropy(&self) -> f64 {
        self.focal_elements()
            .map(|(a, m)| {
                let denom = ((1u32 << a.cardinality()) - 1) as f64;
                -m * (m / denom).log2()
            })
            .sum()
    }

    /// Uncertainty discounting by a reliability weight in [0, 1].
    ///
    /// Every mass is scaled by `weight` and the remainder is moved onto the
    /// full frame, so total mass is preserved.
    pub fn discount(&self, weight: f64) -> Self {
        let w = weight.clamp(0.0, 1.0);
        let mut masses = [0.0; 8];
        for (h, m) in self.focal_elements() {
            masses[h.bits() as usize] = m * w;
        }
        masses[Hypothesis::FRAME.bits() as usize] += 1.0 - w;
        Self { masses }
    }
}

impl Default for MassFunction {
    fn default() -> Self {
        Self::vacuous()
    }
}

impl TryFrom<Vec<(Hypothesis, f64)>> for MassFunction {
    type Error = ChronosError;

    fn try_from(focal: Vec<(Hypothesis, f64)>) -> Result<Self, Self::Error> {
        MassFunction::from_focal(focal)
    }
}

impl From<MassFunction> for Vec<(Hypothesis, f64)> {
    fn from(m: MassFunction) -> Self {
        m.focal_elements().collect()
    }
}
