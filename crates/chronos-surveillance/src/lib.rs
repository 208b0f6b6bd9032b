// crates/chronos-surveillance/src/lib.rs
//
// chronos-surveillance: Behavioral surveillance for the Chronos reputation
// engine.
//
// Each actor's interaction outcomes are z-scored against a sliding window and
// fed to a two-sided CUSUM detector; the alarm rate becomes the actor's
// anomaly score.

pub mod cusum;
pub mod monitor;

pub use cusum::Cusum;
pub use monitor::{BehaviorMonitor, Diagnostics, SurveillanceConfig};
