// crates/chronos-dynamics/src/decay.rs
//
// Deterministic time-decay schedules for reputation values.
//
// Used for analytics on inactive actors; the stochastic OU decay lives on
// the dynamics engine.

use serde::{Deserialize, Serialize};

/// Decay schedule for reputation attenuation over idle steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DecayFunction {
    /// value · e^(-lambda · t).
    Exponential { lambda: f64 },
    /// value / (1 + t)^alpha; identity at t = 0.
    PowerLaw { alpha: f64 },
    /// value · h / (h + t); 0 when h <= 0.
    Hyperbolic { half_life: f64 },
}

impl Default for DecayFunction {
    fn default() -> Self {
        DecayFunction::Exponential { lambda: 0.01 }
    }
}

/// Apply a decay schedule to `value` after `elapsed` idle steps.
///
/// The result is clipped to [0, 1].
pub fn apply_decay(value: f64, elapsed: u64, function: &DecayFunction) -> f64 {
    let t = elapsed as f64;
    let decayed = match function {
        DecayFunction::Exponential { lambda } => value * (-lambda * t).exp(),
        DecayFunction::PowerLaw { alpha } => {
            if elapsed == 0 {
                value
            } else {
                value / (1.0 + t).powf(*alpha)
            }
        }
        DecayFunction::Hyperbolic { half_life } => {
            if *half_life <= 0.0 {
                0.0
            } else {
                value * half_life / (half_life + t)
            }
        }
    };
    decayed.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_decay() {
        let f = DecayFunction::Exponential { lambda: 0.1 };
        assert!((apply_decay(1.0, 10, &f) - (-1.0f64).exp()).abs() < 1e-12);
        assert_eq!(apply_decay(0.7, 0, &f), 0.7);
    }

    #[test]
    fn power_law_decay() {
        let f = DecayFunction::PowerLaw { alpha: 0.5 };
        assert_eq!(apply_decay(0.8, 0, &f), 0.8);
        assert!((apply_decay(0.8, 3, &f) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn hyperbolic_halves_at_half_life() {
        let f = DecayFunction::Hyperbolic { half_life: 50.0 };
        assert!((apply_decay(1.0, 50, &f) - 0.5).abs() < 1e-12);
        assert_eq!(apply_decay(1.0, 5, &DecayFunction::Hyperbolic { half_life: 0.0 }), 0.0);
    }

    #[test]
    fn output_is_clipped() {
        let f = DecayFunction::Exponential { lambda: -1.0 };
        assert_eq!(apply_decay(0.9, 10, &f), 1.0);
    }

    #[test]
    fn toml_style_tagging() {
        let f: DecayFunction = serde_json::from_str(r#"{"mode":"power_law","alpha":0.5}"#).unwrap();
        assert!(matches!(f, DecayFunction::PowerLaw { alpha } if alpha == 0.5));
    }
}
