// crates/chronos-network/src/community.rs
//
// Community partitions of the interaction graph and their structural stats.
//
// Detection itself is pluggable behind `CommunityDetector`; this module turns
// a raw actor -> community mapping into per-community density and external
// ratio, and flags tight insular clusters as collusion-suspect.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use chronos_core::ActorId;

use crate::graph::InteractionGraph;

/// A community-detection algorithm over the undirected interaction graph.
///
/// Implementations must assign every node of `graph` to exactly one
/// community. Community ids are opaque; [`Partition::build`] renumbers them.
pub trait CommunityDetector: Send + Sync {
    fn partition(&self, graph: &UnGraphMap<ActorId, ()>) -> BTreeMap<ActorId, usize>;

    /// Human-readable algorithm name, for logs.
    fn name(&self) -> &'static str;
}

/// Structural statistics for one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub id: usize,
    pub members: BTreeSet<ActorId>,
    /// Internal directed edges over n·(n-1) possible ordered pairs.
    pub density: f64,
    /// Edges with exactly one endpoint inside, over all edges touching the
    /// community. 1.0 for a community with no edges at all.
    pub external_ratio: f64,
}

impl CommunityStats {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Dense and insular: density at or above `min_density` and external
    /// ratio at or below `max_external_ratio`.
    pub fn is_suspect(&self, min_density: f64, max_external_ratio: f64) -> bool {
        self.density >= min_density && self.external_ratio <= max_external_ratio
    }
}

/// A complete partition of the interaction graph into communities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    assignment: BTreeMap<ActorId, usize>,
    communities: BTreeMap<usize, CommunityStats>,
    /// Newman modularity of the partition on the undirected projection.
    pub modularity: f64,
}

impl Partition {
    /// Run `detector` on the graph's undirected projection and compute
    /// community statistics against the directed graph.
    ///
    /// Community ids are renumbered 0.. in order of each community's
    /// smallest member, so equal inputs give equal ids.
    pub fn build(graph: &InteractionGraph, detector: &dyn CommunityDetector) -> Self {
        let undirected = graph.undirected();
        let raw = detector.partition(&undirected);

        let mut renumber: BTreeMap<usize, usize> = BTreeMap::new();
        let mut assignment = BTreeMap::new();
        for (&actor, &community) in &raw {
            let next = renumber.len();
            let id = *renumber.entry(community).or_insert(next);
            assignment.insert(actor, id);
        }

        let mut members: BTreeMap<usize, BTreeSet<ActorId>> = BTreeMap::new();
        for (&actor, &id) in &assignment {
            members.entry(id).or_default().insert(actor);
        }

        let mut internal: BTreeMap<usize, usize> = BTreeMap::new();
        let mut external: BTreeMap<usize, usize> = BTreeMap::new();
        for (source, target, _) in graph.edges() {
            match (assignment.get(&source), assignment.get(&target)) {
                (Some(a), Some(b)) if a == b => *internal.entry(*a).or_default() += 1,
                (Some(a), Some(b)) => {
                    *external.entry(*a).or_default() += 1;
                    *external.entry(*b).or_default() += 1;
                }
                _ => {}
            }
        }

        let communities = members
            .into_iter()
            .map(|(id, members)| {
                let n = members.len();
                let possible = n * n.saturating_sub(1);
                let int = internal.get(&id).copied().unwrap_or(0);
                let ext = external.get(&id).copied().unwrap_or(0);
                let density = if possible > 0 {
                    int as f64 / possible as f64
                } else {
                    0.0
                };
                let external_ratio = if int + ext > 0 {
                    ext as f64 / (int + ext) as f64
                } else {
                    1.0
                };
                (
                    id,
                    CommunityStats {
                        id,
                        members,
                        density,
                        external_ratio,
                    },
                )
            })
            .collect();

        let modularity = modularity(&undirected, &assignment);
        Self {
            assignment,
            communities,
            modularity,
        }
    }

    pub fn community_of(&self, actor: ActorId) -> Option<usize> {
        self.assignment.get(&actor).copied()
    }

    pub fn stats(&self, community: usize) -> Option<&CommunityStats> {
        self.communities.get(&community)
    }

    pub fn communities(&self) -> impl Iterator<Item = &CommunityStats> {
        self.communities.values()
    }

    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    pub fn assignment(&self) -> &BTreeMap<ActorId, usize> {
        &self.assignment
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }
}

/// Newman modularity Q of `assignment` on a unit-weight undirected graph.
///
/// Q = sum over communities of (L_c / m) - (d_c / 2m)^2, where L_c is the
/// number of intra-community edges and d_c the total degree. 0.0 for a graph
/// with no edges.
pub fn modularity(graph: &UnGraphMap<ActorId, ()>, assignment: &BTreeMap<ActorId, usize>) -> f64 {
    let m = graph.edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }
    let mut intra: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree: BTreeMap<usize, f64> = BTreeMap::new();
    for (a, b, _) in graph.all_edges() {
        let (Some(&ca), Some(&cb)) = (assignment.get(&a), assignment.get(&b)) else {
            continue;
        };
        if ca == cb {
            *intra.entry(ca).or_default() += 1.0;
        }
        *degree.entry(ca).or_default() += 1.0;
        *degree.entry(cb).or_default() += 1.0;
    }
    degree
        .iter()
        .map(|(c, d)| {
            let l = intra.get(c).copied().unwrap_or(0.0);
            l / m - (d / (2.0 * m)).powi(2)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronos_core::Outcome;

    /// Assigns every actor to the community given by `id % modulus`.
    struct ModuloDetector(u32);

    impl CommunityDetector for ModuloDetector {
        fn partition(&self, graph: &UnGraphMap<ActorId, ()>) -> BTreeMap<ActorId, usize> {
            graph
                .nodes()
                .map(|a| (a, (a.get() % self.0) as usize + 100))
                .collect()
        }

        fn name(&self) -> &'static str {
            "modulo"
        }
    }

    fn clique(g: &mut InteractionGraph, ids: &[u32]) {
        for &u in ids {
            for &v in ids {
                g.record(ActorId(u), ActorId(v), Outcome::Positive);
            }
        }
    }

    #[test]
    fn full_clique_has_unit_density_and_no_external_edges() {
        let mut g = InteractionGraph::new();
        clique(&mut g, &[0, 2, 4]);
        clique(&mut g, &[1, 3, 5]);
        let p = Partition::build(&g, &ModuloDetector(2));
        assert_eq!(p.community_count(), 2);
        for stats in p.communities() {
            assert!((stats.density - 1.0).abs() < 1e-12);
            assert_eq!(stats.external_ratio, 0.0);
            assert!(stats.is_suspect(0.6, 0.2));
        }
    }

    #[test]
    fn ids_are_renumbered_by_smallest_member() {
        let mut g = InteractionGraph::new();
        clique(&mut g, &[0, 1, 2, 3]);
        let p = Partition::build(&g, &ModuloDetector(2));
        assert_eq!(p.community_of(ActorId(0)), Some(0));
        assert_eq!(p.community_of(ActorId(1)), Some(1));
        assert_eq!(p.community_of(ActorId(9)), None);
    }

    #[test]
    fn cross_edges_raise_external_ratio() {
        let mut g = InteractionGraph::new();
        g.record(ActorId(0), ActorId(2), Outcome::Positive);
        g.record(ActorId(0), ActorId(1), Outcome::Positive);
        let p = Partition::build(&g, &ModuloDetector(2));
        let even = p.stats(p.community_of(ActorId(0)).unwrap()).unwrap();
        assert!((even.external_ratio - 0.5).abs() < 1e-12);
        assert!((even.density - 0.5).abs() < 1e-12);
        let odd = p.stats(p.community_of(ActorId(1)).unwrap()).unwrap();
        assert_eq!(odd.density, 0.0);
        assert_eq!(odd.external_ratio, 1.0);
    }

    #[test]
    fn modularity_of_two_disjoint_triangles() {
        let mut g = InteractionGraph::new();
        clique(&mut g, &[0, 2, 4]);
        clique(&mut g, &[1, 3, 5]);
        let p = Partition::build(&g, &ModuloDetector(2));
        // Two equal components: Q = 2 * (3/6 - (6/12)^2) = 0.5.
        assert!((p.modularity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn modularity_of_edgeless_graph_is_zero() {
        let mut g = InteractionGraph::new();
        g.ensure(ActorId(1));
        let p = Partition::build(&g, &ModuloDetector(2));
        assert_eq!(p.modularity, 0.0);
        assert_eq!(p.stats(0).unwrap().external_ratio, 1.0);
    }
}
