// crates/chronos-surveillance/src/monitor.rs
//
// Per-actor behavioral surveillance.
//
// State is created lazily on an actor's first observation and discarded when
// the actor is isolated.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use chronos_core::math::{mean, population_std, shannon_entropy, z_score};
use chronos_core::{ActorId, ChronosError, Outcome};

use crate::cusum::Cusum;

/// Configuration for the behavior monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveillanceConfig {
    /// Sliding window length for z-scoring and entropy. Default: 30.
    pub window: usize,
    /// CUSUM control limit H. Default: 4.0.
    pub cusum_h: f64,
    /// CUSUM drift slack k. Default: 0.5.
    pub cusum_k: f64,
}

impl Default for SurveillanceConfig {
    fn default() -> Self {
        Self {
            window: 30,
            cusum_h: 4.0,
            cusum_k: 0.5,
        }
    }
}

impl SurveillanceConfig {
    pub fn validate(&self) -> Result<(), ChronosError> {
        if self.window == 0 {
            return Err(ChronosError::InvalidConfig(
                "surveillance.window must be > 0".to_string(),
            ));
        }
        if !self.cusum_h.is_finite() || self.cusum_h <= 0.0 {
            return Err(ChronosError::InvalidConfig(format!(
                "surveillance.cusum_h must be finite and > 0, got {}",
                self.cusum_h
            )));
        }
        if !self.cusum_k.is_finite() || self.cusum_k < 0.0 {
            return Err(ChronosError::InvalidConfig(format!(
                "surveillance.cusum_k must be finite and non-negative, got {}",
                self.cusum_k
            )));
        }
        Ok(())
    }
}

/// Surveillance result of one `monitor` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub actor: ActorId,
    /// Mean outcome over the window; 0.5 for an empty window.
    pub mean_outcome: f64,
    /// Shannon entropy (bits) of the window's {negative, positive} split.
    pub entropy: f64,
    /// Cumulative alarms over cumulative observations.
    pub anomaly_score: f64,
    /// Observation indices (0-based, per actor) that raised an alarm in this call.
    pub alarm_steps: Vec<u64>,
    pub cusum_pos: f64,
    pub cusum_neg: f64,
    /// Total observations seen for this actor.
    pub observed: u64,
}

impl Diagnostics {
    /// Diagnostics of an actor with no observations: a neutral window and
    /// no alarms.
    pub fn idle(actor: ActorId) -> Self {
        Self {
            actor,
            mean_outcome: 0.5,
            entropy: shannon_entropy(&[0.5, 0.5]),
            anomaly_score: 0.0,
            alarm_steps: Vec::new(),
            cusum_pos: 0.0,
            cusum_neg: 0.0,
            observed: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct StreamState {
    window: VecDeque<f64>,
    cusum: Cusum,
    alarms: u64,
    observed: u64,
}

impl StreamState {
    fn window_values(&self) -> Vec<f64> {
        self.window.iter().copied().collect()
    }
}

/// CUSUM-based anomaly monitor over every actor's outcome stream.
#[derive(Debug, Clone, Default)]
pub struct BehaviorMonitor {
    config: SurveillanceConfig,
    states: BTreeMap<ActorId, StreamState>,
}

impl BehaviorMonitor {
    pub fn new(config: SurveillanceConfig) -> Self {
        Self {
            config,
            states: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &SurveillanceConfig {
        &self.config
    }

    /// Process `outcomes` in order and report the actor's diagnostics.
    ///
    /// Each outcome is appended to the window first, then z-scored against
    /// it and fed to the CUSUM detector.
    pub fn monitor(&mut self, actor: ActorId, outcomes: &[Outcome]) -> Diagnostics {
        let window_len = self.config.window.max(1);
        let (slack, limit) = (self.config.cusum_k, self.config.cusum_h);
        let state = self.states.entry(actor).or_default();
        let mut alarm_steps = Vec::new();

        for outcome in outcomes {
            let value = outcome.as_f64();
            if state.window.len() == window_len {
                state.window.pop_front();
            }
            state.window.push_back(value);

            let values = state.window_values();
            let z = if values.len() < 2 {
                0.0
            } else {
                z_score(value, mean(&values), population_std(&values))
            };

            if state.cusum.update(z, slack, limit) {
                state.alarms += 1;
                alarm_steps.push(state.observed);
                tracing::debug!("CUSUM alarm for {} at observation {}", actor, state.observed);
            }
            state.observed += 1;
        }

        let values = state.window_values();
        let mean_outcome = if values.is_empty() { 0.5 } else { mean(&values) };
        let entropy = shannon_entropy(&[1.0 - mean_outcome, mean_outcome]);

        Diagnostics {
            actor,
            mean_outcome,
            entropy,
            anomaly_score: state.alarms as f64 / state.observed.max(1) as f64,
            alarm_steps,
            cusum_pos: state.cusum.pos,
            cusum_neg: state.cusum.neg,
            observed: state.observed,
        }
    }

    /// Current anomaly score; 0.0 for unseen actors.
    pub fn anomaly_score(&self, actor: ActorId) -> f64 {
        match self.states.get(&actor) {
            Some(s) if s.observed > 0 => s.alarms as f64 / s.observed as f64,
            _ => 0.0,
        }
    }

    /// Discard an actor's surveillance state.
    pub fn forget(&mut self, actor: ActorId) {
        self.states.remove(&actor);
    }

    pub fn tracked_actors(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positives(n: usize) -> Vec<Outcome> {
        vec![Outcome::Positive; n]
    }

    #[test]
    fn unseen_actor_has_zero_anomaly() {
        let monitor = BehaviorMonitor::default();
        assert_eq!(monitor.anomaly_score(ActorId(1)), 0.0);
    }

    #[test]
    fn empty_stream_reports_neutral_window() {
        let mut monitor = BehaviorMonitor::default();
        let d = monitor.monitor(ActorId(1), &[]);
        assert_eq!(d.mean_outcome, 0.5);
        assert!((d.entropy - 1.0).abs() < 1e-12);
        assert_eq!(d.anomaly_score, 0.0);
        assert_eq!(d.observed, 0);
        assert_eq!(d, Diagnostics::idle(ActorId(1)));
    }

    #[test]
    fn constant_stream_never_alarms() {
        let mut monitor = BehaviorMonitor::default();
        let d = monitor.monitor(ActorId(1), &positives(100));
        assert!(d.alarm_steps.is_empty());
        assert_eq!(d.entropy, 0.0);
        assert_eq!(d.mean_outcome, 1.0);
        assert_eq!(d.cusum_pos, 0.0);
    }

    #[test]
    fn sudden_defection_alarms_and_rearms() {
        let mut monitor = BehaviorMonitor::default();
        let mut stream = positives(25);
        stream.push(Outcome::Negative);
        let d = monitor.monitor(ActorId(7), &stream);
        // 25 ones and one zero: z of the zero is -5, so neg = 4.5 > H.
        assert_eq!(d.alarm_steps, vec![25]);
        assert_eq!(d.cusum_pos, 0.0);
        assert_eq!(d.cusum_neg, 0.0);
        assert!((d.anomaly_score - 1.0 / 26.0).abs() < 1e-12);
        assert_eq!(monitor.anomaly_score(ActorId(7)), d.anomaly_score);
    }

    #[test]
    fn alarm_indices_continue_across_calls() {
        let mut monitor = BehaviorMonitor::default();
        monitor.monitor(ActorId(2), &positives(25));
        let d = monitor.monitor(ActorId(2), &[Outcome::Negative]);
        assert_eq!(d.alarm_steps, vec![25]);
        assert_eq!(d.observed, 26);
    }

    #[test]
    fn anomaly_score_decays_with_clean_observations() {
        let mut monitor = BehaviorMonitor::default();
        let mut stream = positives(25);
        stream.push(Outcome::Negative);
        let first = monitor.monitor(ActorId(3), &stream).anomaly_score;
        let later = monitor.monitor(ActorId(3), &positives(40)).anomaly_score;
        assert!(later < first);
    }

    #[test]
    fn window_is_bounded() {
        let mut monitor = BehaviorMonitor::new(SurveillanceConfig {
            window: 4,
            ..SurveillanceConfig::default()
        });
        monitor.monitor(ActorId(1), &[Outcome::Negative; 10]);
        let d = monitor.monitor(ActorId(1), &positives(4));
        assert_eq!(d.mean_outcome, 1.0);
    }

    #[test]
    fn forget_discards_state() {
        let mut monitor = BehaviorMonitor::default();
        let mut stream = positives(25);
        stream.push(Outcome::Negative);
        monitor.monitor(ActorId(4), &stream);
        assert!(monitor.anomaly_score(ActorId(4)) > 0.0);
        monitor.forget(ActorId(4));
        assert_eq!(monitor.anomaly_score(ActorId(4)), 0.0);
        assert_eq!(monitor.tracked_actors(), 0);
    }

    #[test]
    fn rejects_zero_window() {
        let config = SurveillanceConfig {
            window: 0,
            ..SurveillanceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChronosError::InvalidConfig(_))));
    }

    mod props {
        use crate::monitor::BehaviorMonitor;
        use chronos_core::{ActorId, Outcome};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn diagnostics_stay_in_range(bits in proptest::collection::vec(any::<bool>(), 0..200)) {
                let mut monitor = BehaviorMonitor::default();
                let stream: Vec<Outcome> = bits.into_iter().map(Outcome::from).collect();
                let d = monitor.monitor(ActorId(0), &stream);
                prop_assert!((0.0..=1.0).contains(&d.anomaly_score));
                prop_assert!((0.0..=1.0).contains(&d.mean_outcome));
                prop_assert!(d.entropy >= 0.0 && d.entropy <= 1.0 + 1e-12);
                prop_assert!(d.cusum_pos >= 0.0 && d.cusum_pos <= 4.0);
                prop_assert!(d.cusum_neg >= 0.0 && d.cusum_neg <= 4.0);
            }
        }
    }
}
