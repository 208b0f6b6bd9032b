// crates/chronos-engine/src/snapshot.rs
//
// External checkpoint of actor reputation state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use chronos_core::{ActorId, ChronosError, Irv};

/// One actor's exported state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub reputation: f64,
    pub volatility: f64,
    pub isolated: bool,
    pub irv: Irv,
    pub isolated_at: Option<u64>,
}

/// Reputation, isolation, and IRV state of every registered actor at a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub actors: Vec<ActorSnapshot>,
}

impl Snapshot {
    pub fn isolated_count(&self) -> usize {
        self.actors.iter().filter(|a| a.isolated).count()
    }

    pub fn to_json_pretty(&self) -> Result<String, ChronosError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChronosError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to `path` as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ChronosError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
