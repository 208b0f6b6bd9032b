// crates/chronos-network/src/lib.rs
//
// chronos-network: Interaction graph, community structure, and collusion
// penalties for the Chronos reputation engine.
//
// The interaction engine is the only shared-mutation point of a tick: it owns
// the directed interaction graph, recomputes the community partition on a
// fixed cadence, and attenuates evidence exchanged inside collusion-suspect
// communities.

pub mod community;
pub mod engine;
pub mod graph;
pub mod history;
pub mod louvain;
pub mod propagation;

// Re-export key types for ergonomic access from downstream crates.
pub use community::{modularity, CommunityDetector, CommunityStats, Partition};
pub use engine::{InteractionConfig, InteractionEngine};
pub use graph::{InteractionEdge, InteractionGraph};
pub use history::{PartitionHistory, PartitionSnapshot};
pub use louvain::Louvain;
pub use propagation::{propagate, PropagationConfig};
