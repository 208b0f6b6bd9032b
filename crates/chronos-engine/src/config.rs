// crates/chronos-engine/src/config.rs
//
// Global configuration for the reputation pipeline.

use serde::{Deserialize, Serialize};

use chronos_core::ChronosError;
use chronos_dynamics::DynamicsConfig;
use chronos_evidence::{FusionConfig, SynthesisConfig};
use chronos_network::{InteractionConfig, PropagationConfig};
use chronos_surveillance::SurveillanceConfig;

/// Configuration of the whole pipeline, one nested table per engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Isolation threshold tau: an actor whose updated reputation falls
    /// below it is isolated. Default: 0.4.
    pub isolation_threshold: f64,
    /// Weight of the anomaly score when discounting the static evidence
    /// score: r_static · (1 - anomaly_discount · anomaly). Default: 0.5.
    pub anomaly_discount: f64,
    /// Reputation reported for registered actors before their first update.
    /// Default: 0.5.
    pub initial_reputation: f64,
    pub synthesis: SynthesisConfig,
    pub fusion: FusionConfig,
    pub interaction: InteractionConfig,
    pub surveillance: SurveillanceConfig,
    pub dynamics: DynamicsConfig,
    pub propagation: PropagationConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            isolation_threshold: 0.4,
            anomaly_discount: 0.5,
            initial_reputation: 0.5,
            synthesis: SynthesisConfig::default(),
            fusion: FusionConfig::default(),
            interaction: InteractionConfig::default(),
            surveillance: SurveillanceConfig::default(),
            dynamics: DynamicsConfig::default(),
            propagation: PropagationConfig::default(),
        }
    }
}

fn unit_interval(name: &str, value: f64) -> Result<(), ChronosError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ChronosError::InvalidConfig(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

impl CoreConfig {
    /// Reject configurations that would make the pipeline ill-defined.
    pub fn validate(&self) -> Result<(), ChronosError> {
        unit_interval("isolation_threshold", self.isolation_threshold)?;
        unit_interval("anomaly_discount", self.anomaly_discount)?;
        unit_interval("initial_reputation", self.initial_reputation)?;
        unit_interval(
            "synthesis.revocation_prob_honest",
            self.synthesis.revocation_prob_honest,
        )?;
        unit_interval(
            "synthesis.revocation_prob_adversarial",
            self.synthesis.revocation_prob_adversarial,
        )?;
        if !self.fusion.entropy_ceiling.is_finite() || self.fusion.entropy_ceiling <= 0.0 {
            return Err(ChronosError::InvalidConfig(format!(
                "fusion.entropy_ceiling must be finite and > 0, got {}",
                self.fusion.entropy_ceiling
            )));
        }
        unit_interval("fusion.revocation_penalty", self.fusion.revocation_penalty)?;
        if !self.fusion.depth_penalty.is_finite() || self.fusion.depth_penalty < 0.0 {
            return Err(ChronosError::InvalidConfig(format!(
                "fusion.depth_penalty must be finite and non-negative, got {}",
                self.fusion.depth_penalty
            )));
        }
        unit_interval("propagation.damping_factor", self.propagation.damping_factor)?;
        unit_interval("propagation.blend", self.propagation.blend)?;
        self.interaction.validate()?;
        self.surveillance.validate()?;
        self.dynamics.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.isolation_threshold, 0.4);
        assert_eq!(config.interaction.fan_out, 3);
        assert_eq!(config.surveillance.cusum_h, 4.0);
        assert_eq!(config.fusion.entropy_ceiling, 2.5);
        assert_eq!(config.dynamics.theta0, 0.30);
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let config = CoreConfig {
            isolation_threshold: 1.5,
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChronosError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_nested_errors() {
        let mut config = CoreConfig::default();
        config.surveillance.window = 0;
        assert!(config.validate().is_err());

        let mut config = CoreConfig::default();
        config.fusion.entropy_ceiling = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"isolation_threshold":0.3,"interaction":{"fan_out":5}}"#)
                .unwrap();
        assert_eq!(config.isolation_threshold, 0.3);
        assert_eq!(config.interaction.fan_out, 5);
        assert_eq!(config.interaction.recompute_interval, 10);
        assert_eq!(config.surveillance.window, 30);
    }
}
