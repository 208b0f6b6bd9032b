// crates/chronos-engine/src/metrics.rs
//
// Run analytics: time-to-detection and reputation distribution summaries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use chronos_core::math::{mean, percentile, population_std};
use chronos_core::ActorId;

use crate::registry::ActorRecord;

/// Gini coefficient of reputations.
pub use chronos_core::math::gini_coefficient as gini;

/// Records the first step at which each target actor is seen below the
/// isolation threshold.
#[derive(Debug, Clone, Default)]
pub struct DetectionTracker {
    targets: BTreeSet<ActorId>,
    threshold: f64,
    detected: BTreeMap<ActorId, u64>,
}

impl DetectionTracker {
    pub fn new(targets: BTreeSet<ActorId>, threshold: f64) -> Self {
        Self {
            targets,
            threshold,
            detected: BTreeMap::new(),
        }
    }

    pub fn targets(&self) -> &BTreeSet<ActorId> {
        &self.targets
    }

    /// Note one actor's reputation at `step`. Only the first crossing of a
    /// target counts.
    pub fn observe(&mut self, actor: ActorId, reputation: f64, step: u64) {
        if self.targets.contains(&actor) && reputation < self.threshold {
            self.detected.entry(actor).or_insert(step);
        }
    }

    pub fn observe_records<'a, I>(&mut self, records: I, step: u64)
    where
        I: IntoIterator<Item = &'a ActorRecord>,
    {
        for record in records {
            self.observe(record.id, record.reputation, step);
        }
    }

    pub fn detection_step(&self, actor: ActorId) -> Option<u64> {
        self.detected.get(&actor).copied()
    }

    pub fn detected_count(&self) -> usize {
        self.detected.len()
    }

    /// Mean detection step over detected targets; `None` before any detection.
    pub fn mean_detection_step(&self) -> Option<f64> {
        if self.detected.is_empty() {
            return None;
        }
        let steps: Vec<f64> = self.detected.values().map(|&s| s as f64).collect();
        Some(mean(&steps))
    }

    /// Fraction of targets detected; 0.0 without targets.
    pub fn detection_rate(&self) -> f64 {
        if self.targets.is_empty() {
            return 0.0;
        }
        self.detected.len() as f64 / self.targets.len() as f64
    }
}

/// Summary statistics of a reputation distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
}

impl DistributionSummary {
    /// All zeros for an empty input.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self {
            mean: mean(&sorted),
            std: population_std(&sorted),
            p10: percentile(&sorted, 10.0),
            p50: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}
