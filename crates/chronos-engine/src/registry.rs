// crates/chronos-engine/src/registry.rs
//
// Actor lifecycle registry.
//
// Valid transitions:
//   Active -> Isolated
//
// Isolation is one-way; an isolated actor's reputation, volatility, and
// evidence vector are frozen at the values that triggered it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chronos_core::{ActorId, ActorStatus, ChronosError, Irv};

/// Per-actor lifecycle and last-known pipeline outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    /// Whether credentials are synthesized with the adversarial profile.
    pub adversarial: bool,
    pub status: ActorStatus,
    pub reputation: f64,
    pub volatility: f64,
    pub irv: Irv,
    /// Step at which the actor was isolated.
    pub isolated_at: Option<u64>,
}

impl ActorRecord {
    pub fn is_active(&self) -> bool {
        self.status == ActorStatus::Active
    }
}

/// All registered actors, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
    actors: BTreeMap<ActorId, ActorRecord>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor as Active. Re-registering only updates the
    /// adversarial flag.
    pub fn register(&mut self, id: ActorId, adversarial: bool, initial_reputation: f64) {
        self.actors
            .entry(id)
            .and_modify(|r| r.adversarial = adversarial)
            .or_insert_with(|| ActorRecord {
                id,
                adversarial,
                status: ActorStatus::Active,
                reputation: initial_reputation,
                volatility: 0.0,
                irv: Irv::zero(),
                isolated_at: None,
            });
    }

    pub fn get(&self, id: ActorId) -> Result<&ActorRecord, ChronosError> {
        self.actors.get(&id).ok_or(ChronosError::UnknownActor(id))
    }

    pub fn get_mut(&mut self, id: ActorId) -> Result<&mut ActorRecord, ChronosError> {
        self.actors.get_mut(&id).ok_or(ChronosError::UnknownActor(id))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    /// Move an active actor to Isolated at `step`. Returns false if it was
    /// already isolated.
    pub fn isolate(&mut self, id: ActorId, step: u64) -> Result<bool, ChronosError> {
        let record = self.get_mut(id)?;
        match record.status {
            ActorStatus::Isolated => Ok(false),
            ActorStatus::Active => {
                tracing::info!(
                    "State transition for {}: {} -> {} (reputation {:.4}, step {})",
                    id,
                    ActorStatus::Active,
                    ActorStatus::Isolated,
                    record.reputation,
                    step
                );
                record.status = ActorStatus::Isolated;
                record.isolated_at = Some(step);
                Ok(true)
            }
        }
    }

    /// Ids of active actors, ascending.
    pub fn active_ids(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|r| r.is_active())
            .map(|r| r.id)
            .collect()
    }

    /// Ids of actors flagged adversarial, ascending.
    pub fn adversarial_ids(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|r| r.adversarial)
            .map(|r| r.id)
            .collect()
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorRecord> {
        self.actors.values()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.actors.values().filter(|r| r.is_active()).count()
    }
}
