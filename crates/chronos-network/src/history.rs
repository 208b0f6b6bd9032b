// crates/chronos-network/src/history.rs
//
// Bounded history of community-partition recomputes.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use chronos_core::math::population_std;

use crate::community::Partition;

/// Summary of one partition recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    /// Engine step at which the partition was computed.
    pub step: u64,
    pub community_count: usize,
    /// Community sizes, indexed by community id.
    pub community_sizes: Vec<usize>,
    pub modularity: f64,
    pub suspect_count: usize,
}

/// Ring buffer of the most recent partition snapshots.
#[derive(Debug, Clone)]
pub struct PartitionHistory {
    capacity: usize,
    snapshots: VecDeque<PartitionSnapshot>,
}

impl PartitionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            snapshots: VecDeque::new(),
        }
    }

    /// Record a partition, evicting the oldest snapshot when full.
    pub fn record(&mut self, step: u64, partition: &Partition, suspect_count: usize) -> &PartitionSnapshot {
        let snapshot = PartitionSnapshot {
            step,
            community_count: partition.community_count(),
            community_sizes: partition.communities().map(|c| c.size()).collect(),
            modularity: partition.modularity,
            suspect_count,
        };
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn latest(&self) -> Option<&PartitionSnapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &PartitionSnapshot> {
        self.snapshots.iter()
    }

    pub fn modularity_history(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.modularity).collect()
    }

    /// 1 - std(modularity history); 1.0 with fewer than two snapshots.
    pub fn stability_score(&self) -> f64 {
        if self.snapshots.len() < 2 {
            return 1.0;
        }
        1.0 - population_std(&self.modularity_history())
    }
}
