// crates/chronos-dynamics/src/engine.rs
//
// Volatility-adjusted jump-diffusion reputation dynamics.
//
// Per-actor state (reputation, adaptive theta, bounded history) is created
// lazily on the first update. All randomness comes from one seeded generator
// owned by the engine, so identical call sequences reproduce bit-identical
// trajectories.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use chronos_core::math::{clip_unit, population_std, standard_normal};
use chronos_core::{ActorId, ChronosError, Irv};

use crate::ou::{adapt_theta, euler_maruyama, surprise_ratio};

/// Configuration for the dynamics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    /// Integration step. Default: 1.0.
    pub dt: f64,
    /// Initial mean-reversion speed. Default: 0.30.
    pub theta0: f64,
    /// Diffusion scale. Default: 0.03.
    pub sigma: f64,
    /// Standard deviation of jump magnitudes. Default: 0.35.
    pub jump_scale: f64,
    /// Theta adaptation rate. Default: 0.05.
    pub alpha: f64,
    /// History length for realized volatility. Default: 20.
    pub history_window: usize,
    /// Surprise ratio above which a jump is injected. Default: 3.0.
    pub jump_threshold: f64,
    /// Seed of the engine's generator. Default: 0.
    pub seed: u64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            theta0: 0.30,
            sigma: 0.03,
            jump_scale: 0.35,
            alpha: 0.05,
            history_window: 20,
            jump_threshold: 3.0,
            seed: 0,
        }
    }
}

impl DynamicsConfig {
    pub fn validate(&self) -> Result<(), ChronosError> {
        if self.history_window == 0 {
            return Err(ChronosError::InvalidConfig(
                "dynamics.history_window must be > 0".to_string(),
            ));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ChronosError::InvalidConfig(format!(
                "dynamics.dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        for (name, value) in [
            ("theta0", self.theta0),
            ("sigma", self.sigma),
            ("jump_scale", self.jump_scale),
            ("alpha", self.alpha),
            ("jump_threshold", self.jump_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChronosError::InvalidConfig(format!(
                    "dynamics.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one dynamics update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsStep {
    /// New reputation in [0, 1].
    pub reputation: f64,
    /// Population standard deviation of the recent reputation history.
    pub volatility: f64,
    /// Surprise ratio gamma = epsilon / noise floor, before theta adapts.
    pub surprise_ratio: f64,
    /// Whether a discrete jump was injected.
    pub jumped: bool,
    /// Mean-reversion speed after adaptation.
    pub theta: f64,
}

#[derive(Debug, Clone)]
struct ActorState {
    x: f64,
    theta: f64,
    history: VecDeque<f64>,
}

/// Jump-diffusion reputation engine.
#[derive(Debug, Clone)]
pub struct DynamicsEngine {
    config: DynamicsConfig,
    states: BTreeMap<ActorId, ActorState>,
    rng: StdRng,
}

impl DynamicsEngine {
    pub fn new(config: DynamicsConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            states: BTreeMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    /// Current reputation of an actor, if it has been updated at least once.
    pub fn reputation(&self, actor: ActorId) -> Option<f64> {
        self.states.get(&actor).map(|s| s.x)
    }

    pub fn theta(&self, actor: ActorId) -> Option<f64> {
        self.states.get(&actor).map(|s| s.theta)
    }

    /// Advance one actor by one step.
    ///
    /// The target mu is the clipped belief in {trusted}; `r_static` is the
    /// caller's anomaly-discounted static score. A surprise ratio above the
    /// jump threshold adds a jump of magnitude |N(0, jump_scale)| signed
    /// against the current deviation x - mu (upward when x equals mu).
    pub fn step(&mut self, actor: ActorId, irv: &Irv, r_static: f64) -> DynamicsStep {
        let cfg = &self.config;
        let mu = clip_unit(irv.belief_trusted);
        let window = cfg.history_window.max(1);
        let state = self.states.entry(actor).or_insert_with(|| ActorState {
            x: mu,
            theta: cfg.theta0,
            history: VecDeque::with_capacity(window),
        });

        let epsilon = (r_static - state.x).abs();
        let gamma = surprise_ratio(epsilon, cfg.sigma, state.theta);
        state.theta = adapt_theta(state.theta, epsilon, cfg.alpha, cfg.dt);

        let normal = standard_normal(&mut self.rng);
        let mut x = euler_maruyama(state.x, mu, state.theta, cfg.sigma, cfg.dt, normal);

        let jumped = gamma > cfg.jump_threshold;
        if jumped {
            let direction = jump_direction(state.x, mu);
            let magnitude = (standard_normal(&mut self.rng) * cfg.jump_scale).abs();
            x += direction * magnitude;
            tracing::debug!(
                "Jump for {}: gamma={:.2}, magnitude={:.4}, direction={}",
                actor,
                gamma,
                magnitude,
                direction
            );
        }

        state.x = clip_unit(x);
        if state.history.len() == window {
            state.history.pop_front();
        }
        state.history.push_back(state.x);
        let history: Vec<f64> = state.history.iter().copied().collect();

        DynamicsStep {
            reputation: state.x,
            volatility: population_std(&history),
            surprise_ratio: gamma,
            jumped,
            theta: state.theta,
        }
    }

    /// Pure OU trajectory (no jumps, no evidence) of `steps` increments,
    /// returning `steps + 1` points starting at `x0`, each clipped to [0, 1].
    pub fn ou_trajectory(&mut self, x0: f64, mu: f64, theta: f64, steps: usize) -> Vec<f64> {
        let mut trajectory = Vec::with_capacity(steps + 1);
        let mut x = x0;
        trajectory.push(x);
        for _ in 0..steps {
            let normal = standard_normal(&mut self.rng);
            x = clip_unit(euler_maruyama(x, mu, theta, self.config.sigma, self.config.dt, normal));
            trajectory.push(x);
        }
        trajectory
    }

    /// Stochastic decay toward 0.5 over `elapsed` steps:
    /// r + theta0·(0.5 - r)·t + volatility·N(0,1)·sqrt(t), clipped to [0, 1].
    pub fn decay(&mut self, reputation: f64, volatility: f64, elapsed: u64) -> f64 {
        let t = elapsed as f64;
        let drift = self.config.theta0 * (0.5 - reputation) * t;
        let diffusion = volatility * standard_normal(&mut self.rng) * t.sqrt();
        clip_unit(reputation + drift + diffusion)
    }

    /// Drop an actor's state.
    pub fn forget(&mut self, actor: ActorId) {
        self.states.remove(&actor);
    }
}

fn jump_direction(x: f64, mu: f64) -> f64 {
    if x > mu {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn irv(bt: f64) -> Irv {
        Irv {
            belief_trusted: bt,
            ..Irv::zero()
        }
    }

    #[test]
    fn first_step_starts_from_evidence_target() {
        let mut engine = DynamicsEngine::new(DynamicsConfig {
            sigma: 0.0,
            ..DynamicsConfig::default()
        });
        let s = engine.step(ActorId(1), &irv(0.7), 0.7);
        assert!((s.reputation - 0.7).abs() < 1e-12);
        assert_eq!(s.volatility, 0.0);
        assert!(!s.jumped);
    }

    #[test]
    fn reverts_toward_target_without_noise() {
        let mut engine = DynamicsEngine::new(DynamicsConfig {
            sigma: 0.0,
            jump_threshold: f64::INFINITY,
            ..DynamicsConfig::default()
        });
        engine.step(ActorId(1), &irv(0.2), 0.2);
        let mut last = 0.2;
        for _ in 0..20 {
            last = engine.step(ActorId(1), &irv(0.9), 0.9).reputation;
        }
        assert!(last > 0.85, "should approach 0.9, got {}", last);
    }

    #[test]
    fn large_surprise_triggers_jump() {
        let mut engine = DynamicsEngine::new(DynamicsConfig::default());
        engine.step(ActorId(1), &irv(0.5), 0.5);
        // Evidence target collapses below the current reputation.
        let s = engine.step(ActorId(1), &irv(0.1), 0.05);
        assert!(s.surprise_ratio > 3.0);
        assert!(s.jumped);
    }

    #[test]
    fn small_surprise_does_not_jump() {
        let mut engine = DynamicsEngine::new(DynamicsConfig::default());
        let first = engine.step(ActorId(1), &irv(0.6), 0.6).reputation;
        let s = engine.step(ActorId(1), &irv(0.6), first + 0.01);
        assert!(s.surprise_ratio < 1.0);
        assert!(!s.jumped);
    }

    #[test]
    fn jump_direction_opposes_deviation() {
        assert_eq!(jump_direction(0.6, 0.4), -1.0);
        assert_eq!(jump_direction(0.3, 0.4), 1.0);
        assert_eq!(jump_direction(0.4, 0.4), 1.0);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = || {
            let mut engine = DynamicsEngine::new(DynamicsConfig::default());
            (0..50)
                .map(|i| engine.step(ActorId(i % 3), &irv(0.3 + 0.01 * i as f64), 0.4).reputation)
                .collect::<Vec<f64>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ou_trajectory_has_n_plus_one_points() {
        let mut engine = DynamicsEngine::new(DynamicsConfig::default());
        let t = engine.ou_trajectory(0.5, 0.8, 0.3, 25);
        assert_eq!(t.len(), 26);
        assert_eq!(t[0], 0.5);
        assert!(t.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn deterministic_decay_without_volatility() {
        let mut engine = DynamicsEngine::new(DynamicsConfig::default());
        // 0.9 + 0.3 * (0.5 - 0.9) * 2 = 0.66
        assert!((engine.decay(0.9, 0.0, 2) - 0.66).abs() < 1e-12);
        assert_eq!(engine.decay(0.9, 0.0, 0), 0.9);
    }

    #[test]
    fn rejects_non_positive_dt() {
        let config = DynamicsConfig {
            dt: 0.0,
            ..DynamicsConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChronosError::InvalidConfig(_))));
    }

    mod props {
        use crate::engine::{DynamicsConfig, DynamicsEngine};
        use chronos_core::{ActorId, Irv};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reputation_stays_bounded(
                seed in any::<u64>(),
                inputs in proptest::collection::vec((-1.0f64..2.0, -1.0f64..2.0), 1..60),
            ) {
                let mut engine = DynamicsEngine::new(DynamicsConfig { seed, ..DynamicsConfig::default() });
                for (bt, r_static) in inputs {
                    let irv = Irv { belief_trusted: bt, ..Irv::zero() };
                    let s = engine.step(ActorId(0), &irv, r_static);
                    prop_assert!((0.0..=1.0).contains(&s.reputation));
                    prop_assert!(s.volatility >= 0.0);
                    prop_assert!(s.theta >= 1e-4 && s.theta <= 10.0);
                }
            }
        }
    }
}
