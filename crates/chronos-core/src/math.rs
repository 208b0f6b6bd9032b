// crates/chronos-core/src/math.rs
//
// Numeric helpers shared across the Chronos crates.
//
// All helpers are total over their domain except the probability transforms
// that take a scaling parameter, which reject non-positive values.

use rand::Rng;

use crate::error::ChronosError;

/// Probabilities at or below this value are ignored by entropy computations.
pub const ENTROPY_EPS: f64 = 1e-9;

/// Standard deviations below this value are treated as zero variance.
pub const VARIANCE_EPS: f64 = 1e-9;

/// Clip a value to the unit interval.
pub fn clip_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 with fewer than two observations.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Standard score of `value`; 0.0 when the spread is below [`VARIANCE_EPS`].
pub fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std < VARIANCE_EPS {
        return 0.0;
    }
    (value - mean) / std
}

/// Shannon entropy in bits of a probability vector.
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p > ENTROPY_EPS)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Temperature-scaled softmax.
///
/// Returns `InvalidParameter` when `temperature` is not strictly positive.
pub fn softmax(values: &[f64], temperature: f64) -> Result<Vec<f64>, ChronosError> {
    if temperature.is_nan() || temperature <= 0.0 {
        return Err(ChronosError::InvalidParameter(format!(
            "temperature must be > 0, got {temperature}"
        )));
    }
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| ((v - max) / temperature).exp()).collect();
    let total: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / total).collect())
}

/// Gini coefficient of non-negative values; 0.0 when the total is ~0.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().cloned().filter(|v| *v >= 0.0).collect();
    let total: f64 = sorted.iter().sum();
    if total < 1e-12 {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 + 1.0) * v)
        .sum();
    2.0 * weighted / (n * total) - (n + 1.0) / n
}

/// Linear-interpolated percentile (`q` in [0, 100]) of an ascending slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// One draw from N(0, 1) via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); flip it so ln never sees 0.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
