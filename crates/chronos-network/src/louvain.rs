// crates/chronos-network/src/louvain.rs
//
// Louvain modularity maximization.
//
// Each level greedily moves nodes to the neighboring community with the
// largest modularity gain, then collapses communities into super-nodes and
// repeats until a level makes no move. Nodes are visited in ascending order
// and ties keep the earlier candidate, so the result is deterministic.

use std::collections::BTreeMap;

use petgraph::graphmap::UnGraphMap;

use chronos_core::ActorId;

use crate::community::CommunityDetector;

/// Louvain community detector.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Upper bound on aggregation levels. Default: 16.
    pub max_levels: usize,
    /// Minimum modularity gain that counts as an improvement. Default: 1e-12.
    pub min_gain: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            max_levels: 16,
            min_gain: 1e-12,
        }
    }
}

/// Weighted undirected graph over dense indices, one level of the hierarchy.
struct Level {
    /// adj[i] maps neighbor j (j != i) to edge weight.
    adj: Vec<BTreeMap<usize, f64>>,
    /// Weight of the self-loop on each node (collapsed internal edges).
    loops: Vec<f64>,
}

impl Level {
    fn len(&self) -> usize {
        self.adj.len()
    }

    fn degree(&self, i: usize) -> f64 {
        self.adj[i].values().sum::<f64>() + 2.0 * self.loops[i]
    }

    /// One local-moving pass to convergence. Returns community per node and
    /// whether any node moved.
    fn local_moving(&self, min_gain: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let degrees: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let two_m: f64 = degrees.iter().sum();
        let mut community: Vec<usize> = (0..n).collect();
        if two_m == 0.0 {
            return (community, false);
        }
        let mut totals = degrees.clone();
        let mut moved_any = false;

        loop {
            let mut moved = false;
            for i in 0..n {
                let current = community[i];
                let k_i = degrees[i];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&j, &w) in &self.adj[i] {
                    *links.entry(community[j]).or_default() += w;
                }

                totals[current] -= k_i;
                let gain = |c: usize, k_in: f64| k_in - totals[c] * k_i / two_m;
                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&c, &k_in) in &links {
                    let g = gain(c, k_in);
                    if g > best_gain + min_gain {
                        best = c;
                        best_gain = g;
                    }
                }
                totals[best] += k_i;

                if best != current {
                    community[i] = best;
                    moved = true;
                    moved_any = true;
                }
            }
            if !moved {
                break;
            }
        }
        (community, moved_any)
    }

    /// Collapse communities into super-nodes. `community` must be dense 0..k.
    fn aggregate(&self, community: &[usize], k: usize) -> Level {
        let mut adj = vec![BTreeMap::new(); k];
        let mut loops = vec![0.0; k];
        for i in 0..self.len() {
            let ci = community[i];
            loops[ci] += self.loops[i];
            for (&j, &w) in &self.adj[i] {
                let cj = community[j];
                if ci == cj {
                    // Each undirected edge is visited from both endpoints.
                    loops[ci] += w / 2.0;
                } else {
                    *adj[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        Level { adj, loops }
    }
}

/// Renumber community labels to 0..k in order of first appearance.
fn compact(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut map: BTreeMap<usize, usize> = BTreeMap::new();
    let mut order = Vec::with_capacity(labels.len());
    for &label in labels {
        let next = map.len();
        order.push(*map.entry(label).or_insert(next));
    }
    (order, map.len())
}

impl CommunityDetector for Louvain {
    fn partition(&self, graph: &UnGraphMap<ActorId, ()>) -> BTreeMap<ActorId, usize> {
        let mut actors: Vec<ActorId> = graph.nodes().collect();
        actors.sort();
        let index: BTreeMap<ActorId, usize> =
            actors.iter().enumerate().map(|(i, &a)| (a, i)).collect();

        let mut adj = vec![BTreeMap::new(); actors.len()];
        for (a, b, _) in graph.all_edges() {
            if a == b {
                continue;
            }
            let (i, j) = (index[&a], index[&b]);
            *adj[i].entry(j).or_insert(0.0) += 1.0;
            *adj[j].entry(i).or_insert(0.0) += 1.0;
        }
        let mut level = Level {
            loops: vec![0.0; actors.len()],
            adj,
        };

        // membership[node] = index of its super-node at the current level.
        let mut membership: Vec<usize> = (0..actors.len()).collect();
        for _ in 0..self.max_levels {
            let (labels, moved) = level.local_moving(self.min_gain);
            if !moved {
                break;
            }
            let (dense, k) = compact(&labels);
            for m in membership.iter_mut() {
                *m = dense[*m];
            }
            level = level.aggregate(&dense, k);
        }

        actors.into_iter().zip(membership).collect()
    }

    fn name(&self) -> &'static str {
        "louvain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::modularity;

    fn clique_edges(g: &mut UnGraphMap<ActorId, ()>, ids: &[u32]) {
        for (n, &u) in ids.iter().enumerate() {
            for &v in &ids[n + 1..] {
                g.add_edge(ActorId(u), ActorId(v), ());
            }
        }
    }

    #[test]
    fn single_clique_forms_one_community() {
        let mut g = UnGraphMap::new();
        clique_edges(&mut g, &[0, 1, 2, 3, 4]);
        let p = Louvain::default().partition(&g);
        let first = p[&ActorId(0)];
        assert!(p.values().all(|&c| c == first));
    }

    #[test]
    fn bridged_cliques_split_at_the_bridge() {
        let mut g = UnGraphMap::new();
        clique_edges(&mut g, &[0, 1, 2, 3, 4]);
        clique_edges(&mut g, &[5, 6, 7, 8, 9]);
        g.add_edge(ActorId(4), ActorId(5), ());
        let p = Louvain::default().partition(&g);
        for i in 1..5 {
            assert_eq!(p[&ActorId(i)], p[&ActorId(0)]);
            assert_eq!(p[&ActorId(i + 5)], p[&ActorId(5)]);
        }
        assert_ne!(p[&ActorId(0)], p[&ActorId(5)]);
        assert!(modularity(&g, &p) > 0.4);
    }

    #[test]
    fn isolated_nodes_keep_their_own_community() {
        let mut g = UnGraphMap::new();
        g.add_node(ActorId(1));
        g.add_node(ActorId(2));
        let p = Louvain::default().partition(&g);
        assert_eq!(p.len(), 2);
        assert_ne!(p[&ActorId(1)], p[&ActorId(2)]);
    }

    #[test]
    fn deterministic_across_runs() {
        let mut g = UnGraphMap::new();
        for i in 0..30u32 {
            g.add_edge(ActorId(i), ActorId((i * 7 + 3) % 30), ());
            g.add_edge(ActorId(i), ActorId((i + 1) % 30), ());
        }
        let a = Louvain::default().partition(&g);
        let b = Louvain::default().partition(&g);
        assert_eq!(a, b);
    }

    #[test]
    fn never_worse_than_singletons() {
        let mut g = UnGraphMap::new();
        for i in 0..20u32 {
            g.add_edge(ActorId(i), ActorId((i * 3 + 1) % 20), ());
        }
        let p = Louvain::default().partition(&g);
        let singletons: BTreeMap<ActorId, usize> =
            g.nodes().map(|a| (a, a.get() as usize)).collect();
        assert!(modularity(&g, &p) >= modularity(&g, &singletons) - 1e-12);
    }
}
