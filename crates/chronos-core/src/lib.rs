// crates/chronos-core/src/lib.rs
//
// chronos-core: Core types, evidence calculus primitives, and numeric helpers
// for the Chronos reputation engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines actor identities, the frame of discernment and its hypothesis
// lattice, mass functions, credential records, the reputation-evidence
// vector, and the protocol-wide error type.

pub mod credential;
pub mod error;
pub mod frame;
pub mod identity;
pub mod interaction;
pub mod irv;
pub mod mass;
pub mod math;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use chronos_core::MassFunction;`

// Evidence calculus
pub use frame::{Hypothesis, Label, LATTICE};
pub use irv::Irv;
pub use mass::{MassFunction, MASS_TOLERANCE};

// Credentials
pub use credential::{AttributeValue, Credential, CredentialType, IssuerTier};

// Actors and interactions
pub use identity::{ActorId, ActorStatus};
pub use interaction::Outcome;

// Error type
pub use error::ChronosError;
