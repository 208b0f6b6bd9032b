// crates/chronos-network/src/graph.rs
//
// Directed interaction graph with per-pair interaction counts.
//
// Nodes only ever get added. Repeat interactions on the same ordered pair
// update the existing edge in place. Undirected neighbor sets are kept
// alongside the directed graph for structural-similarity queries.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graphmap::{DiGraphMap, UnGraphMap};
use serde::{Deserialize, Serialize};

use chronos_core::{ActorId, Outcome};

/// Aggregated record of all interactions from one actor to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionEdge {
    /// Number of interactions on this ordered pair.
    pub count: u32,
    /// Outcome of the most recent interaction.
    pub last_outcome: Outcome,
}

/// The interaction graph: directed, weighted by interaction count.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    graph: DiGraphMap<ActorId, InteractionEdge>,
    neighbors: BTreeMap<ActorId, BTreeSet<ActorId>>,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor with no interactions. No-op if already present.
    pub fn ensure(&mut self, actor: ActorId) {
        self.graph.add_node(actor);
        self.neighbors.entry(actor).or_default();
    }

    /// Record one interaction `source -> target`.
    ///
    /// Self-interactions are ignored and reported as `false`.
    pub fn record(&mut self, source: ActorId, target: ActorId, outcome: Outcome) -> bool {
        if source == target {
            return false;
        }
        self.ensure(source);
        self.ensure(target);
        match self.graph.edge_weight_mut(source, target) {
            Some(edge) => {
                edge.count += 1;
                edge.last_outcome = outcome;
            }
            None => {
                self.graph.add_edge(
                    source,
                    target,
                    InteractionEdge {
                        count: 1,
                        last_outcome: outcome,
                    },
                );
            }
        }
        self.neighbors.entry(source).or_default().insert(target);
        self.neighbors.entry(target).or_default().insert(source);
        true
    }

    pub fn edge(&self, source: ActorId, target: ActorId) -> Option<&InteractionEdge> {
        self.graph.edge_weight(source, target)
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.graph.contains_node(actor)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct ordered pairs that have interacted.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All actors, ascending.
    pub fn actors(&self) -> Vec<ActorId> {
        let mut nodes: Vec<ActorId> = self.graph.nodes().collect();
        nodes.sort();
        nodes
    }

    /// All directed edges as `(source, target, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (ActorId, ActorId, &InteractionEdge)> {
        self.graph.all_edges()
    }

    /// Undirected neighbors of `actor` (either direction), excluding itself.
    pub fn neighbors(&self, actor: ActorId) -> BTreeSet<ActorId> {
        self.neighbors.get(&actor).cloned().unwrap_or_default()
    }

    /// Neighbor set including the actor itself, as used for Jaccard similarity.
    pub fn closed_neighborhood(&self, actor: ActorId) -> BTreeSet<ActorId> {
        let mut set = self.neighbors(actor);
        set.insert(actor);
        set
    }

    /// Undirected projection: one unit edge per connected pair.
    pub fn undirected(&self) -> UnGraphMap<ActorId, ()> {
        let mut projection = UnGraphMap::new();
        for actor in self.actors() {
            projection.add_node(actor);
        }
        for (a, b, _) in self.graph.all_edges() {
            projection.add_edge(a, b, ());
        }
        projection
    }
}

/// Jaccard index of two sets; 0.0 when both are empty.
pub fn jaccard(a: &BTreeSet<ActorId>, b: &BTreeSet<ActorId>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_pairs_update_in_place() {
        let mut g = InteractionGraph::new();
        g.record(ActorId(1), ActorId(2), Outcome::Positive);
        g.record(ActorId(1), ActorId(2), Outcome::Negative);
        let e = g.edge(ActorId(1), ActorId(2)).unwrap();
        assert_eq!(e.count, 2);
        assert_eq!(e.last_outcome, Outcome::Negative);
        assert_eq!(g.edge_count(), 1);
        assert!(g.edge(ActorId(2), ActorId(1)).is_none());
    }

    #[test]
    fn neighbor_sets_are_symmetric() {
        let mut g = InteractionGraph::new();
        g.record(ActorId(1), ActorId(2), Outcome::Positive);
        assert!(g.neighbors(ActorId(1)).contains(&ActorId(2)));
        assert!(g.neighbors(ActorId(2)).contains(&ActorId(1)));
        assert!(g.closed_neighborhood(ActorId(2)).contains(&ActorId(2)));
    }

    #[test]
    fn self_interactions_are_ignored() {
        let mut g = InteractionGraph::new();
        assert!(!g.record(ActorId(4), ActorId(4), Outcome::Positive));
        assert_eq!(g.edge_count(), 0);
        assert!(g.neighbors(ActorId(4)).is_empty());
    }

    #[test]
    fn undirected_projection_merges_reciprocal_edges() {
        let mut g = InteractionGraph::new();
        g.record(ActorId(1), ActorId(2), Outcome::Positive);
        g.record(ActorId(2), ActorId(1), Outcome::Positive);
        g.ensure(ActorId(3));
        let u = g.undirected();
        assert_eq!(u.edge_count(), 1);
        assert_eq!(u.node_count(), 3);
    }

    #[test]
    fn jaccard_index() {
        let a: BTreeSet<ActorId> = [1, 2, 3].into_iter().map(ActorId).collect();
        let b: BTreeSet<ActorId> = [2, 3, 4].into_iter().map(ActorId).collect();
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-12);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }
}
