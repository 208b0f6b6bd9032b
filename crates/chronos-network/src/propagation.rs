// crates/chronos-network/src/propagation.rs
//
// Trust propagation over the interaction graph.
//
// PageRank with damping scores how central each actor is among those who
// interact with it; the score then scales and blends base reputations with
// those of incoming interaction partners. Analytics only: the result never
// feeds back into the per-step pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chronos_core::ActorId;

use crate::graph::InteractionGraph;

/// Configuration for trust propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Probability of following an interaction edge vs. teleporting. Default: 0.85.
    pub damping_factor: f64,
    /// Maximum power iterations. Default: 50.
    pub max_iterations: u32,
    /// Convergence threshold on the L1 change of scores. Default: 1e-6.
    pub convergence_threshold: f64,
    /// Weight of incoming partners' reputation in the blend. Default: 0.3.
    pub blend: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 50,
            convergence_threshold: 1e-6,
            blend: 0.3,
        }
    }
}

/// PageRank over the subgraph induced by `actors`, edges weighted by
/// interaction count. Dangling mass is spread uniformly.
pub fn pagerank(
    graph: &InteractionGraph,
    actors: &[ActorId],
    config: &PropagationConfig,
) -> BTreeMap<ActorId, f64> {
    let n = actors.len();
    if n == 0 {
        return BTreeMap::new();
    }
    let index: BTreeMap<ActorId, usize> = actors.iter().enumerate().map(|(i, &a)| (a, i)).collect();

    // out[j] lists (i, weight) for edges j -> i.
    let mut out: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for (source, target, edge) in graph.edges() {
        if let (Some(&j), Some(&i)) = (index.get(&source), index.get(&target)) {
            out[j].push((i, edge.count as f64));
        }
    }
    let out_sums: Vec<f64> = out.iter().map(|e| e.iter().map(|(_, w)| w).sum()).collect();

    let uniform = 1.0 / n as f64;
    let d = config.damping_factor;
    let mut scores = vec![uniform; n];

    for _ in 0..config.max_iterations {
        let dangling: f64 = (0..n).filter(|&j| out_sums[j] == 0.0).map(|j| scores[j]).sum();
        let mut next = vec![(1.0 - d) * uniform + d * dangling * uniform; n];
        for j in 0..n {
            if out_sums[j] > 0.0 {
                for &(i, w) in &out[j] {
                    next[i] += d * scores[j] * w / out_sums[j];
                }
            }
        }

        let delta: f64 = scores.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < config.convergence_threshold {
            break;
        }
    }

    actors.iter().copied().zip(scores).collect()
}

/// Propagate base reputations through the interaction graph.
///
/// Each actor's base value is scaled by (0.7 + 0.3 · pagerank / max_pagerank)
/// and blended with the interaction-weighted mean base reputation of its
/// in-neighbors: (1 - blend) · own + blend · incoming. Actors without
/// in-neighbors keep their scaled value. Results are clipped to [0, 1].
pub fn propagate(
    graph: &InteractionGraph,
    base: &BTreeMap<ActorId, f64>,
    config: &PropagationConfig,
) -> BTreeMap<ActorId, f64> {
    let actors: Vec<ActorId> = base.keys().copied().collect();
    let ranks = pagerank(graph, &actors, config);
    let max_rank = ranks.values().cloned().fold(0.0_f64, f64::max);

    let mut incoming: BTreeMap<ActorId, (f64, f64)> = BTreeMap::new();
    for (source, target, edge) in graph.edges() {
        if let (Some(&rep), true) = (base.get(&source), base.contains_key(&target)) {
            let w = edge.count as f64;
            let entry = incoming.entry(target).or_insert((0.0, 0.0));
            entry.0 += w * rep;
            entry.1 += w;
        }
    }

    base.iter()
        .map(|(&actor, &rep)| {
            let rank = ranks.get(&actor).copied().unwrap_or(0.0);
            let normalized = if max_rank > 0.0 { rank / max_rank } else { 0.0 };
            let own = rep * (0.7 + 0.3 * normalized);
            let value = match incoming.get(&actor) {
                Some(&(sum, weight)) if weight > 0.0 => {
                    (1.0 - config.blend) * own + config.blend * (sum / weight)
                }
                _ => own,
            };
            (actor, value.clamp(0.0, 1.0))
        })
        .collect()
}
