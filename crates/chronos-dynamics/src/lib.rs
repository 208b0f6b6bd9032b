// crates/chronos-dynamics/src/lib.rs
//
// chronos-dynamics: Reputation dynamics for the Chronos reputation engine.
//
// Reputation evolves as a mean-reverting Ornstein-Uhlenbeck process toward
// the actor's evidence target, integrated by Euler-Maruyama, with discrete
// jumps when the observed surprise dwarfs the process noise. Deterministic
// decay schedules live alongside for analytics.

pub mod decay;
pub mod engine;
pub mod ou;

pub use decay::{apply_decay, DecayFunction};
pub use engine::{DynamicsConfig, DynamicsEngine, DynamicsStep};
