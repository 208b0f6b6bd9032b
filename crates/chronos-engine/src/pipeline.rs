// crates/chronos-engine/src/pipeline.rs
//
// The reputation pipeline facade.
//
// One `ReputationCore` owns every engine instance and the actor registry.
// The orchestrator drives it either through the individual per-actor
// operations (synthesize, fuse, interact, surveil, update) or through
// `tick()`, which runs the whole population for one step:
//
//   1. credential synthesis and fusion for every active actor, in parallel
//      (pure functions of the actor id and the configuration),
//   2. interactions, surveillance, and dynamics serially in ascending
//      actor-id order, since the interaction graph is the single shared
//      writer,
//   3. `advance_time()`, which may recompute the community partition.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use chronos_core::math::mean;
use chronos_core::{ActorId, ChronosError, Credential, Irv, Outcome};
use chronos_dynamics::DynamicsEngine;
use chronos_evidence::{CredentialSynthesizer, EvidenceFusionEngine};
use chronos_network::{propagate, InteractionEngine};
use chronos_surveillance::{BehaviorMonitor, Diagnostics};

use crate::config::CoreConfig;
use crate::metrics::{gini, DistributionSummary};
use crate::registry::{ActorRecord, ActorRegistry};
use crate::snapshot::{ActorSnapshot, Snapshot};

/// Everything one actor's pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub actor: ActorId,
    pub irv: Irv,
    /// Interactions this actor initiated, in sampling order.
    pub interactions: Vec<(ActorId, Outcome)>,
    /// Collusion-penalized evidence, one value per interaction.
    pub penalized: Vec<f64>,
    pub diagnostics: Diagnostics,
    /// Anomaly-discounted static evidence score fed to the dynamics.
    pub r_static: f64,
    pub reputation: f64,
    pub volatility: f64,
    /// Whether this step isolated the actor.
    pub isolated: bool,
}

/// Summary of one whole-population tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// The step this tick completed (1-based).
    pub step: u64,
    /// Active actors after the tick.
    pub active: usize,
    pub newly_isolated: Vec<ActorId>,
    /// Mean reputation of the remaining active actors; 0.0 when none remain.
    pub mean_reputation: f64,
    /// CUSUM alarms raised during the tick.
    pub alarms: usize,
}

/// Facade over the five engines and the actor lifecycle.
pub struct ReputationCore {
    config: CoreConfig,
    synthesizer: CredentialSynthesizer,
    fusion: EvidenceFusionEngine,
    interactions: InteractionEngine,
    monitor: BehaviorMonitor,
    dynamics: DynamicsEngine,
    registry: ActorRegistry,
}

impl ReputationCore {
    /// Validate `config` and build every engine from it.
    pub fn new(config: CoreConfig) -> Result<Self, ChronosError> {
        config.validate()?;
        Ok(Self {
            synthesizer: CredentialSynthesizer::new(config.synthesis.clone()),
            fusion: EvidenceFusionEngine::new(config.fusion.clone()),
            interactions: InteractionEngine::new(config.interaction.clone()),
            monitor: BehaviorMonitor::new(config.surveillance.clone()),
            dynamics: DynamicsEngine::new(config.dynamics.clone()),
            registry: ActorRegistry::new(),
            config,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Completed ticks, as counted by `advance_time()`.
    pub fn step(&self) -> u64 {
        self.interactions.step()
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn interactions(&self) -> &InteractionEngine {
        &self.interactions
    }

    pub fn monitor(&self) -> &BehaviorMonitor {
        &self.monitor
    }

    pub fn actor(&self, actor: ActorId) -> Result<&ActorRecord, ChronosError> {
        self.registry.get(actor)
    }

    pub fn active_ids(&self) -> Vec<ActorId> {
        self.registry.active_ids()
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Register an actor as Active with the initial reputation.
    pub fn register(&mut self, actor: ActorId, adversarial: bool) {
        self.registry
            .register(actor, adversarial, self.config.initial_reputation);
    }

    /// Switch the credential profile of a registered actor.
    pub fn set_adversarial(&mut self, actor: ActorId, adversarial: bool) -> Result<(), ChronosError> {
        self.registry.get_mut(actor)?.adversarial = adversarial;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Per-actor operations
    // ---------------------------------------------------------------

    /// This step's credentials for `actor`.
    pub fn synthesize(&self, actor: ActorId, adversarial: bool) -> Vec<Credential> {
        self.synthesizer.generate(
            actor,
            self.config.synthesis.credentials_per_step,
            adversarial,
        )
    }

    /// Fuse credentials into the reputation-evidence vector.
    pub fn fuse(&self, actor: ActorId, credentials: &[Credential]) -> Irv {
        self.fusion.process(actor, credentials)
    }

    /// Sample this step's interactions for `actor` among `peers`.
    ///
    /// Isolated actors initiate nothing.
    pub fn interact(&mut self, actor: ActorId, peers: &[ActorId]) -> Vec<(ActorId, Outcome)> {
        if self.is_isolated(actor) {
            return Vec::new();
        }
        self.interactions.generate_interactions(actor, peers)
    }

    /// Feed outcomes to the behavior monitor.
    ///
    /// Isolated actors are no longer tracked and get idle diagnostics.
    pub fn surveil(&mut self, actor: ActorId, outcomes: &[Outcome]) -> Diagnostics {
        if self.is_isolated(actor) {
            return Diagnostics::idle(actor);
        }
        self.monitor.monitor(actor, outcomes)
    }

    fn is_isolated(&self, actor: ActorId) -> bool {
        self.registry.get(actor).map_or(false, |r| !r.is_active())
    }

    /// Advance the reputation dynamics of `actor`.
    ///
    /// Isolated actors keep their frozen (reputation, volatility). An active
    /// actor whose new reputation falls below the isolation threshold is
    /// isolated at the in-progress step and its surveillance state dropped.
    pub fn update(&mut self, actor: ActorId, irv: &Irv, r_static: f64) -> Result<(f64, f64), ChronosError> {
        let record = self.registry.get(actor)?;
        if !record.is_active() {
            return Ok((record.reputation, record.volatility));
        }

        let outcome = self.dynamics.step(actor, irv, r_static);
        let record = self.registry.get_mut(actor)?;
        record.reputation = outcome.reputation;
        record.volatility = outcome.volatility;
        record.irv = *irv;

        if outcome.reputation < self.config.isolation_threshold {
            let step = self.interactions.step() + 1;
            if self.registry.isolate(actor, step)? {
                self.monitor.forget(actor);
            }
        }
        Ok((outcome.reputation, outcome.volatility))
    }

    /// Run the full pipeline for one actor against the current active pool.
    ///
    /// Returns `None` for isolated actors.
    pub fn step_actor(&mut self, actor: ActorId) -> Result<Option<StepReport>, ChronosError> {
        let record = self.registry.get(actor)?;
        if !record.is_active() {
            return Ok(None);
        }
        let credentials = self.synthesize(actor, record.adversarial);
        let irv = self.fuse(actor, &credentials);
        let pool = self.registry.active_ids();
        self.finish_actor(actor, irv, &pool).map(Some)
    }

    fn finish_actor(&mut self, actor: ActorId, irv: Irv, pool: &[ActorId]) -> Result<StepReport, ChronosError> {
        let interactions = self.interact(actor, pool);
        let penalized: Vec<f64> = interactions
            .iter()
            .map(|&(target, outcome)| {
                self.interactions
                    .penalized_evidence(actor, target, outcome.as_f64())
            })
            .collect();
        let outcomes: Vec<Outcome> = interactions.iter().map(|&(_, o)| o).collect();
        let diagnostics = self.surveil(actor, &outcomes);

        let r_static = self.static_score(&irv, &penalized, diagnostics.anomaly_score);
        let (reputation, volatility) = self.update(actor, &irv, r_static)?;
        let isolated = !self.registry.get(actor)?.is_active();

        Ok(StepReport {
            actor,
            irv,
            interactions,
            penalized,
            diagnostics,
            r_static,
            reputation,
            volatility,
            isolated,
        })
    }

    /// Mean penalized evidence (or belief in {trusted} when there was no
    /// interaction), discounted by the anomaly score.
    fn static_score(&self, irv: &Irv, penalized: &[f64], anomaly: f64) -> f64 {
        let base = if penalized.is_empty() {
            irv.belief_trusted
        } else {
            mean(penalized)
        };
        base * (1.0 - self.config.anomaly_discount * anomaly)
    }

    // ---------------------------------------------------------------
    // Hooks
    // ---------------------------------------------------------------

    /// Tick boundary: bump the step counter and recompute communities on
    /// the configured interval.
    pub fn advance_time(&mut self) {
        self.interactions.advance_time();
    }

    /// Scripted interaction, bypassing sampling.
    pub fn force_interaction(&mut self, source: ActorId, target: ActorId, outcome: Outcome) {
        self.interactions.force_interaction(source, target, outcome);
    }

    /// Collusion-penalized value of an endorsement between two actors.
    pub fn penalized_evidence(&self, endorser: ActorId, target: ActorId, raw: f64) -> f64 {
        self.interactions.penalized_evidence(endorser, target, raw)
    }

    // ---------------------------------------------------------------
    // Tick driver
    // ---------------------------------------------------------------

    /// Advance every active actor by one step, then call `advance_time()`.
    pub fn tick(&mut self) -> Result<TickReport, ChronosError> {
        let active = self.registry.active_ids();

        let synthesizer = &self.synthesizer;
        let fusion = &self.fusion;
        let registry = &self.registry;
        let count = self.config.synthesis.credentials_per_step;
        let evidence: Vec<(ActorId, Irv)> = active
            .par_iter()
            .map(|&actor| {
                let adversarial = registry.get(actor).map(|r| r.adversarial).unwrap_or(false);
                let credentials = synthesizer.generate(actor, count, adversarial);
                (actor, fusion.process(actor, &credentials))
            })
            .collect();

        let mut pool = active;
        let mut newly_isolated = Vec::new();
        let mut alarms = 0;
        for (actor, irv) in evidence {
            let report = self.finish_actor(actor, irv, &pool)?;
            alarms += report.diagnostics.alarm_steps.len();
            if report.isolated {
                pool.retain(|&id| id != actor);
                newly_isolated.push(actor);
            }
        }

        self.advance_time();

        let reputations: Vec<f64> = self
            .registry
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.reputation)
            .collect();
        let report = TickReport {
            step: self.step(),
            active: reputations.len(),
            newly_isolated,
            mean_reputation: mean(&reputations),
            alarms,
        };
        tracing::debug!(
            "Tick {} complete: {} active, {} isolated this tick, mean reputation {:.4}",
            report.step,
            report.active,
            report.newly_isolated.len(),
            report.mean_reputation
        );
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Analytics and exports
    // ---------------------------------------------------------------

    /// Serializable view of every actor's reputation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step(),
            actors: self
                .registry
                .iter()
                .map(|r| ActorSnapshot {
                    id: r.id,
                    reputation: r.reputation,
                    volatility: r.volatility,
                    isolated: !r.is_active(),
                    irv: r.irv,
                    isolated_at: r.isolated_at,
                })
                .collect(),
        }
    }

    /// Reputations propagated through the interaction graph. Analytics only;
    /// the per-step pipeline never reads these.
    pub fn propagated_reputations(&self) -> BTreeMap<ActorId, f64> {
        let base: BTreeMap<ActorId, f64> = self
            .registry
            .iter()
            .map(|r| (r.id, r.reputation))
            .collect();
        propagate(self.interactions.graph(), &base, &self.config.propagation)
    }

    /// Distribution of reputations over all registered actors.
    pub fn reputation_summary(&self) -> DistributionSummary {
        DistributionSummary::from_values(&self.reputations())
    }

    /// Gini coefficient of reputations over all registered actors.
    pub fn reputation_gini(&self) -> f64 {
        gini(&self.reputations())
    }

    fn reputations(&self) -> Vec<f64> {
        self.registry.iter().map(|r| r.reputation).collect()
    }

    /// Evidence-free OU trajectory of `steps` increments.
    pub fn ou_trajectory(&mut self, x0: f64, mu: f64, theta: f64, steps: usize) -> Vec<f64> {
        self.dynamics.ou_trajectory(x0, mu, theta, steps)
    }

    /// Stochastic decay of a reputation toward 0.5 over `elapsed` steps.
    pub fn decay(&mut self, reputation: f64, volatility: f64, elapsed: u64) -> f64 {
        self.dynamics.decay(reputation, volatility, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronos_core::ActorStatus;

    fn core_with(n: u32) -> ReputationCore {
        let mut core = ReputationCore::new(CoreConfig::default()).unwrap();
        for i in 0..n {
            core.register(ActorId(i), false);
        }
        core
    }

    #[test]
    fn rejects_invalid_config() {
        let config = CoreConfig {
            isolation_threshold: -0.1,
            ..CoreConfig::default()
        };
        assert!(ReputationCore::new(config).is_err());
    }

    #[test]
    fn synthesize_uses_configured_count() {
        let core = core_with(1);
        assert_eq!(core.synthesize(ActorId(0), false).len(), 5);
    }

    #[test]
    fn update_unknown_actor_fails() {
        let mut core = core_with(1);
        let err = core.update(ActorId(9), &Irv::zero(), 0.5).unwrap_err();
        assert!(matches!(err, ChronosError::UnknownActor(ActorId(9))));
    }

    #[test]
    fn low_update_isolates_and_freezes() {
        let mut core = core_with(2);
        let irv = Irv {
            belief_trusted: 0.05,
            ..Irv::zero()
        };
        let (rep, vol) = core.update(ActorId(0), &irv, 0.0).unwrap();
        assert!(rep < 0.4, "target 0.05 should land below tau, got {}", rep);
        let record = core.actor(ActorId(0)).unwrap();
        assert_eq!(record.status, ActorStatus::Isolated);
        assert_eq!(record.isolated_at, Some(1));

        let high = Irv {
            belief_trusted: 0.95,
            ..Irv::zero()
        };
        for _ in 0..5 {
            assert_eq!(core.update(ActorId(0), &high, 1.0).unwrap(), (rep, vol));
        }
        assert_eq!(core.active_ids(), vec![ActorId(1)]);
    }

    #[test]
    fn static_score_discounts_anomaly() {
        let core = core_with(0);
        let irv = Irv {
            belief_trusted: 0.8,
            ..Irv::zero()
        };
        assert!((core.static_score(&irv, &[], 0.0) - 0.8).abs() < 1e-12);
        assert!((core.static_score(&irv, &[1.0, 0.0], 0.0) - 0.5).abs() < 1e-12);
        // 0.5 · (1 - 0.5 · 0.4) = 0.4
        assert!((core.static_score(&irv, &[1.0, 0.0], 0.4) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn step_actor_skips_isolated() {
        let mut core = core_with(3);
        let report = core.step_actor(ActorId(0)).unwrap().unwrap();
        assert_eq!(report.interactions.len(), 2, "fan-out degrades to the two peers");
        assert_eq!(report.penalized.len(), 2);
        assert!(report.interactions.iter().all(|(t, _)| *t != ActorId(0)));

        core.update(ActorId(1), &Irv::zero(), 0.0).unwrap();
        assert!(core.step_actor(ActorId(1)).unwrap().is_none());
    }

    #[test]
    fn isolated_actor_neither_interacts_nor_is_surveilled() {
        let mut core = core_with(4);
        let peers = core.active_ids();
        core.surveil(ActorId(2), &[Outcome::Positive, Outcome::Negative]);
        assert_eq!(core.monitor().tracked_actors(), 1);

        core.update(ActorId(2), &Irv::zero(), 0.0).unwrap();
        assert_eq!(core.monitor().tracked_actors(), 0);
        let edges = core.interactions().graph().edge_count();

        assert!(core.interact(ActorId(2), &peers).is_empty());
        assert_eq!(core.interactions().graph().edge_count(), edges);

        let d = core.surveil(ActorId(2), &[Outcome::Negative; 8]);
        assert_eq!(d, Diagnostics::idle(ActorId(2)));
        assert_eq!(core.monitor().tracked_actors(), 0, "state stays dropped");

        // Active actors are unaffected.
        assert_eq!(core.interact(ActorId(0), &peers).len(), 3);
        assert_eq!(core.surveil(ActorId(0), &[Outcome::Positive]).observed, 1);
    }

    #[test]
    fn tick_advances_step_and_reports() {
        let mut core = core_with(10);
        let report = core.tick().unwrap();
        assert_eq!(report.step, 1);
        assert_eq!(core.step(), 1);
        assert_eq!(report.active + report.newly_isolated.len(), 10);
        assert!(core.interactions().graph().edge_count() > 0);
    }

    #[test]
    fn ticks_are_reproducible() {
        let run = || {
            let mut core = core_with(12);
            core.set_adversarial(ActorId(3), true).unwrap();
            for _ in 0..15 {
                core.tick().unwrap();
            }
            core.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn snapshot_lists_every_actor() {
        let mut core = core_with(4);
        core.tick().unwrap();
        let snap = core.snapshot();
        assert_eq!(snap.step, 1);
        assert_eq!(snap.actors.len(), 4);
        assert!(snap.actors.iter().all(|a| a.irv.is_bounded()));
    }

    #[test]
    fn propagated_reputations_cover_registry() {
        let mut core = core_with(6);
        for _ in 0..3 {
            core.tick().unwrap();
        }
        let propagated = core.propagated_reputations();
        assert_eq!(propagated.len(), 6);
        assert!(propagated.values().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn analytics_on_fresh_registry() {
        let core = core_with(4);
        let summary = core.reputation_summary();
        assert_eq!(summary.mean, 0.5);
        assert_eq!(summary.std, 0.0);
        assert_eq!(core.reputation_gini(), 0.0);
    }
}
