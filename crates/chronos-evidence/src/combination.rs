// crates/chronos-evidence/src/combination.rs
//
// Combination and conditioning rules over the hypothesis lattice.
//
// Fusion follows Dempster's rule with one explicit policy: when the conflict
// mass reaches 1.0 the result is total ignorance instead of an error.

use chronos_core::{Hypothesis, MassFunction, LATTICE};

/// Conflict mass K: total product mass landing on disjoint hypothesis pairs,
/// capped at 1.0.
pub fn conflict(m1: &MassFunction, m2: &MassFunction) -> f64 {
    let mut k = 0.0;
    for (a, ma) in m1.focal_elements() {
        for (b, mb) in m2.focal_elements() {
            if !a.intersects(b) {
                k += ma * mb;
            }
        }
    }
    k.min(1.0)
}

/// Combine two mass functions, returning the fused mass and the conflict K.
///
/// fused(C) = sum over A∩B = C of m1(A)·m2(B), divided by (1 - K).
/// With K >= 1.0 the evidence is totally contradictory and the result is
/// the vacuous mass function.
pub fn combine_with_conflict(m1: &MassFunction, m2: &MassFunction) -> (MassFunction, f64) {
    let k = conflict(m1, m2);
    if k >= 1.0 {
        tracing::debug!("Total evidential contradiction (K={}), falling back to ignorance", k);
        return (MassFunction::vacuous(), k);
    }

    let norm = 1.0 - k;
    let mut raw = [0.0_f64; 8];
    for (a, ma) in m1.focal_elements() {
        for (b, mb) in m2.focal_elements() {
            if let Some(c) = a.intersection(b) {
                raw[c.bits() as usize] += ma * mb;
            }
        }
    }

    let fused = LATTICE
        .iter()
        .map(|&c| (c, raw[c.bits() as usize] / norm))
        .filter(|&(_, m)| m > 0.0);
    let mass = MassFunction::from_focal(fused).unwrap_or_default();
    (mass, k)
}

/// Combine two mass functions, discarding the conflict value.
pub fn combine(m1: &MassFunction, m2: &MassFunction) -> MassFunction {
    combine_with_conflict(m1, m2).0
}

/// Left-to-right pairwise combination. `None` for an empty input.
pub fn combine_all<'a, I>(masses: I) -> Option<MassFunction>
where
    I: IntoIterator<Item = &'a MassFunction>,
{
    let mut iter = masses.into_iter();
    let first = *iter.next()?;
    Some(iter.fold(first, |acc, next| combine(&acc, next)))
}

/// Condition a mass function on a hypothesis.
///
/// Each focal element's mass moves onto its intersection with `given`;
/// disjoint elements are dropped and the rest renormalized. If nothing
/// survives, the result is the vacuous mass function.
pub fn condition(m: &MassFunction, given: Hypothesis) -> MassFunction {
    let conditioned = m
        .focal_elements()
        .filter_map(|(a, ma)| a.intersection(given).map(|c| (c, ma)));
    MassFunction::from_focal(conditioned).unwrap_or_default()
}
