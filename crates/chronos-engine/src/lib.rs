// crates/chronos-engine/src/lib.rs
//
// chronos-engine: The per-step reputation pipeline for the Chronos
// reputation engine.
//
// `ReputationCore` wires the credential synthesizer, fusion engine,
// interaction engine, behavior monitor, and dynamics engine into the
// per-actor pipeline, tracks the actor lifecycle, and drives whole ticks.
// Scenario injectors and run analytics sit on top of it.

pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod registry;
pub mod scenario;
pub mod snapshot;

pub use config::CoreConfig;
pub use metrics::{DetectionTracker, DistributionSummary};
pub use pipeline::{ReputationCore, StepReport, TickReport};
pub use registry::{ActorRecord, ActorRegistry};
pub use scenario::{
    scenario_by_name, Baseline, Collusion, Scenario, Sleeper, Transgression, SCENARIO_NAMES,
};
pub use snapshot::{ActorSnapshot, Snapshot};
