// crates/chronos-core/src/identity.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a simulated actor in the trust network.
///
/// Actor ids are dense integers assigned by the orchestrator. They double as
/// the seed material for per-actor credential synthesis, so they must be
/// stable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl ActorId {
    /// The raw integer id.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ActorId {
    fn from(id: u32) -> Self {
        ActorId(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{:04}", self.0)
    }
}

/// Lifecycle state of an actor.
///
/// Valid transitions:
///   Active -> Isolated
///
/// Isolation is terminal: the actor leaves every interaction pool and its
/// reputation and volatility are frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorStatus {
    /// Participating in interactions and reputation updates.
    Active,
    /// Reputation fell below the isolation threshold.
    Isolated,
}

impl fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorStatus::Active => write!(f, "Active"),
            ActorStatus::Isolated => write!(f, "Isolated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(ActorId(7).to_string(), "actor-0007");
        assert_eq!(ActorId(12345).to_string(), "actor-12345");
    }

    #[test]
    fn ids_order_numerically() {
        let mut ids = vec![ActorId(3), ActorId(1), ActorId(2)];
        ids.sort();
        assert_eq!(ids, vec![ActorId(1), ActorId(2), ActorId(3)]);
    }
}
