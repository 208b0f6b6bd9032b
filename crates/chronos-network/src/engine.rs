// crates/chronos-network/src/engine.rs
//
// Interaction & community engine.
//
// Owns the interaction graph, the seeded generator used for peer sampling and
// outcome draws, and the current community partition. The partition is a
// read-only snapshot between recompute boundaries.

use std::collections::{BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use chronos_core::{ActorId, ChronosError, Outcome};

use crate::community::{CommunityDetector, CommunityStats, Partition};
use crate::graph::{jaccard, InteractionGraph};
use crate::history::PartitionHistory;
use crate::louvain::Louvain;

/// Configuration for the interaction & community engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Peers sampled per actor per step (k). Default: 3.
    pub fan_out: usize,
    /// Steps between community recomputes. Default: 10.
    pub recompute_interval: u64,
    /// Minimum internal density of a suspect community. Default: 0.60.
    pub suspect_density: f64,
    /// Maximum external ratio of a suspect community. Default: 0.20.
    pub suspect_external_ratio: f64,
    /// Penalty weight of structural similarity. Default: 0.5.
    pub beta: f64,
    /// Penalty weight of community density. Default: 0.5.
    pub gamma: f64,
    /// Partition snapshots retained. Default: 20.
    pub history_len: usize,
    /// Seed of the engine's generator. Default: 42.
    pub seed: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            fan_out: 3,
            recompute_interval: 10,
            suspect_density: 0.60,
            suspect_external_ratio: 0.20,
            beta: 0.5,
            gamma: 0.5,
            history_len: 20,
            seed: 42,
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), ChronosError> {
        if self.recompute_interval == 0 {
            return Err(ChronosError::InvalidConfig(
                "interaction.recompute_interval must be > 0".to_string(),
            ));
        }
        if self.history_len == 0 {
            return Err(ChronosError::InvalidConfig(
                "interaction.history_len must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("suspect_density", self.suspect_density),
            ("suspect_external_ratio", self.suspect_external_ratio),
            ("beta", self.beta),
            ("gamma", self.gamma),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChronosError::InvalidConfig(format!(
                    "interaction.{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Records interactions, maintains community structure, and applies the
/// collusion penalty to evidence exchanged inside suspect communities.
pub struct InteractionEngine {
    config: InteractionConfig,
    graph: InteractionGraph,
    detector: Box<dyn CommunityDetector>,
    partition: Option<Partition>,
    history: PartitionHistory,
    rng: StdRng,
    step: u64,
}

impl InteractionEngine {
    /// Create an engine using Louvain community detection.
    pub fn new(config: InteractionConfig) -> Self {
        Self::with_detector(config, Box::new(Louvain::default()))
    }

    pub fn with_detector(config: InteractionConfig, detector: Box<dyn CommunityDetector>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let history = PartitionHistory::new(config.history_len);
        Self {
            config,
            graph: InteractionGraph::new(),
            detector,
            partition: None,
            history,
            rng,
            step: 0,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }

    pub fn history(&self) -> &PartitionHistory {
        &self.history
    }

    /// Steps advanced so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn neighbors(&self, actor: ActorId) -> BTreeSet<ActorId> {
        self.graph.neighbors(actor)
    }

    /// Pair `actor` with up to `fan_out` distinct random peers from
    /// `candidates` and draw a fair binary outcome for each.
    ///
    /// The actor itself is never selected and repeated candidates count
    /// once. When fewer than `fan_out` candidates remain, every remaining
    /// candidate is used.
    pub fn generate_interactions(
        &mut self,
        actor: ActorId,
        candidates: &[ActorId],
    ) -> Vec<(ActorId, Outcome)> {
        self.graph.ensure(actor);
        let mut seen: HashSet<ActorId> = HashSet::with_capacity(candidates.len());
        let mut pool: Vec<ActorId> = Vec::with_capacity(candidates.len());
        for &c in candidates {
            if c == actor || !seen.insert(c) {
                continue;
            }
            if !self.graph.contains(c) {
                self.graph.ensure(c);
            }
            pool.push(c);
        }

        let amount = self.config.fan_out.min(pool.len());
        if amount < self.config.fan_out {
            tracing::debug!(
                "Fan-out for {} degraded to {} (requested {}, {} candidates)",
                actor,
                amount,
                self.config.fan_out,
                pool.len()
            );
        }

        let picks = index::sample(&mut self.rng, pool.len(), amount);
        let mut pairs = Vec::with_capacity(amount);
        for i in picks.iter() {
            let target = pool[i];
            let outcome = Outcome::from(self.rng.gen_bool(0.5));
            self.graph.record(actor, target, outcome);
            pairs.push((target, outcome));
        }
        pairs
    }

    /// Record a scripted interaction, bypassing sampling. Self-interactions
    /// are ignored.
    pub fn force_interaction(&mut self, source: ActorId, target: ActorId, outcome: Outcome) {
        if !self.graph.record(source, target, outcome) {
            tracing::trace!("Ignoring forced self-interaction for {}", source);
        }
    }

    fn is_suspect(&self, stats: &CommunityStats) -> bool {
        stats.is_suspect(self.config.suspect_density, self.config.suspect_external_ratio)
    }

    /// The shared community of `a` and `b`, if they share one and it is suspect.
    pub fn shared_suspect_community(&self, a: ActorId, b: ActorId) -> Option<&CommunityStats> {
        let partition = self.partition.as_ref()?;
        let ca = partition.community_of(a)?;
        let cb = partition.community_of(b)?;
        if ca != cb {
            return None;
        }
        partition.stats(ca).filter(|s| self.is_suspect(s))
    }

    /// Attenuate an endorsement exchanged between `endorser` and `target`.
    ///
    /// Unchanged unless both share a suspect community in the current
    /// partition; then scaled by max(0, 1 - (beta · jaccard + gamma · density)),
    /// with Jaccard over each actor's neighbor set including itself.
    pub fn penalized_evidence(&self, endorser: ActorId, target: ActorId, raw: f64) -> f64 {
        let Some(stats) = self.shared_suspect_community(endorser, target) else {
            return raw;
        };
        let similarity = jaccard(
            &self.graph.closed_neighborhood(endorser),
            &self.graph.closed_neighborhood(target),
        );
        let weight = (1.0 - (self.config.beta * similarity + self.config.gamma * stats.density)).max(0.0);
        weight * raw
    }

    /// Tick boundary: advance the step counter and recompute communities
    /// every `recompute_interval` steps.
    pub fn advance_time(&mut self) {
        self.step += 1;
        if self.step % self.config.recompute_interval.max(1) == 0 {
            self.recompute();
        }
    }

    /// Replace the partition with a fresh one computed on the current graph.
    pub fn recompute(&mut self) {
        let partition = Partition::build(&self.graph, self.detector.as_ref());
        let suspects = partition.communities().filter(|s| self.is_suspect(s)).count();
        tracing::debug!(
            "Recomputed communities with {} at step {}: {} communities, {} suspect, modularity {:.4}",
            self.detector.name(),
            self.step,
            partition.community_count(),
            suspects,
            partition.modularity
        );
        self.history.record(self.step, &partition, suspects);
        self.partition = Some(partition);
    }

    /// Members of every currently suspect community.
    pub fn suspect_actors(&self) -> BTreeSet<ActorId> {
        self.partition
            .iter()
            .flat_map(|p| p.communities())
            .filter(|s| self.is_suspect(s))
            .flat_map(|s| s.members.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u32>) -> Vec<ActorId> {
        range.map(ActorId).collect()
    }

    fn clique(engine: &mut InteractionEngine, members: &[ActorId]) {
        for &u in members {
            for &v in members {
                engine.force_interaction(u, v, Outcome::Positive);
            }
        }
    }

    #[test]
    fn samples_distinct_peers_excluding_self() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        let pool = ids(0..10);
        for _ in 0..50 {
            let pairs = engine.generate_interactions(ActorId(3), &pool);
            assert_eq!(pairs.len(), 3);
            let targets: BTreeSet<ActorId> = pairs.iter().map(|(t, _)| *t).collect();
            assert_eq!(targets.len(), 3);
            assert!(!targets.contains(&ActorId(3)));
        }
    }

    #[test]
    fn repeated_candidates_count_once() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        // Three distinct peers, each listed many times, plus the actor itself.
        let mut pool = Vec::new();
        for _ in 0..20 {
            pool.extend([ActorId(1), ActorId(2), ActorId(0), ActorId(3), ActorId(2)]);
        }
        for _ in 0..30 {
            let pairs = engine.generate_interactions(ActorId(0), &pool);
            let targets: BTreeSet<ActorId> = pairs.iter().map(|(t, _)| *t).collect();
            assert_eq!(pairs.len(), 3);
            assert_eq!(targets, ids(1..4).into_iter().collect::<BTreeSet<_>>());
        }

        let pairs = engine.generate_interactions(ActorId(9), &[ActorId(4), ActorId(4), ActorId(4)]);
        assert_eq!(pairs.len(), 1, "one distinct peer despite three listings");
        assert_eq!(engine.graph().node_count(), 6);
    }

    #[test]
    fn fan_out_degrades_to_available_peers() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        let pairs = engine.generate_interactions(ActorId(0), &ids(0..3));
        assert_eq!(pairs.len(), 2);
        assert!(engine.generate_interactions(ActorId(0), &[ActorId(0)]).is_empty());
    }

    #[test]
    fn same_seed_same_interactions() {
        let pool = ids(0..20);
        let run = || {
            let mut engine = InteractionEngine::new(InteractionConfig::default());
            (0..20)
                .flat_map(|a| engine.generate_interactions(ActorId(a), &pool))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn no_partition_means_no_penalty() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        clique(&mut engine, &ids(0..5));
        assert!(engine.partition().is_none());
        assert_eq!(engine.penalized_evidence(ActorId(0), ActorId(1), 1.0), 1.0);
    }

    #[test]
    fn isolated_clique_fully_suppresses_insider_endorsements() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        let ring = ids(0..5);
        clique(&mut engine, &ring);
        engine.recompute();

        let community = engine
            .shared_suspect_community(ActorId(0), ActorId(1))
            .expect("clique should be flagged suspect");
        assert!((community.density - 1.0).abs() < 1e-12);
        assert_eq!(community.external_ratio, 0.0);

        for &u in &ring {
            for &v in &ring {
                if u != v {
                    assert_eq!(engine.penalized_evidence(u, v, 1.0), 0.0);
                }
            }
        }
        assert_eq!(engine.suspect_actors(), ring.into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn penalty_weight_follows_beta_and_gamma() {
        let config = InteractionConfig {
            beta: 0.2,
            gamma: 0.3,
            ..InteractionConfig::default()
        };
        let mut engine = InteractionEngine::new(config);
        clique(&mut engine, &ids(0..4));
        engine.recompute();
        let w = engine.penalized_evidence(ActorId(0), ActorId(1), 1.0);
        assert!((w - 0.5).abs() < 1e-12, "1 - (0.2 + 0.3) = 0.5, got {}", w);
    }

    #[test]
    fn different_communities_are_not_penalized() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        clique(&mut engine, &ids(0..5));
        clique(&mut engine, &ids(10..15));
        engine.recompute();
        assert_eq!(engine.penalized_evidence(ActorId(0), ActorId(10), 1.0), 1.0);
        assert_eq!(engine.penalized_evidence(ActorId(0), ActorId(1), 1.0), 0.0);
    }

    #[test]
    fn open_communities_are_not_suspect() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        // A sparse ring: density far below the suspect threshold.
        let ring = ids(0..12);
        for i in 0..12 {
            engine.force_interaction(ring[i], ring[(i + 1) % 12], Outcome::Positive);
        }
        engine.recompute();
        assert!(engine.suspect_actors().is_empty());
        assert_eq!(engine.penalized_evidence(ActorId(0), ActorId(1), 1.0), 1.0);
    }

    #[test]
    fn recompute_happens_on_interval_boundaries() {
        let mut engine = InteractionEngine::new(InteractionConfig {
            recompute_interval: 3,
            ..InteractionConfig::default()
        });
        clique(&mut engine, &ids(0..3));
        engine.advance_time();
        engine.advance_time();
        assert!(engine.partition().is_none());
        engine.advance_time();
        assert!(engine.partition().is_some());
        assert_eq!(engine.history().latest().unwrap().step, 3);
        assert_eq!(engine.step(), 3);
    }

    #[test]
    fn partition_is_stale_between_recomputes() {
        let mut engine = InteractionEngine::new(InteractionConfig::default());
        clique(&mut engine, &ids(0..4));
        engine.recompute();
        // New insider edges after the snapshot do not change membership.
        engine.force_interaction(ActorId(0), ActorId(20), Outcome::Positive);
        assert_eq!(engine.partition().unwrap().community_of(ActorId(20)), None);
        assert_eq!(engine.penalized_evidence(ActorId(0), ActorId(20), 1.0), 1.0);
    }

    #[test]
    fn rejects_zero_recompute_interval() {
        let config = InteractionConfig {
            recompute_interval: 0,
            ..InteractionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChronosError::InvalidConfig(_))));
        assert!(InteractionConfig::default().validate().is_ok());
    }
}
