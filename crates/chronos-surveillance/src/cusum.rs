// crates/chronos-surveillance/src/cusum.rs
//
// Two-sided cumulative-sum change-point detector.

use serde::{Deserialize, Serialize};

/// Two one-sided CUSUM accumulators with a shared control limit.
///
/// When either accumulator exceeds the limit an alarm is raised and both
/// reset to exactly zero on that same observation, re-arming the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cusum {
    /// Accumulated upward drift.
    pub pos: f64,
    /// Accumulated downward drift.
    pub neg: f64,
}

impl Cusum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one standardized observation. Returns true on alarm.
    ///
    /// pos = max(0, pos + z - slack), neg = max(0, neg - z - slack).
    pub fn update(&mut self, z: f64, slack: f64, limit: f64) -> bool {
        self.pos = (self.pos + z - slack).max(0.0);
        self.neg = (self.neg - z - slack).max(0.0);
        if self.pos > limit || self.neg > limit {
            self.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.pos = 0.0;
        self.neg = 0.0;
    }
}
