// crates/chronos-evidence/src/lib.rs
//
// chronos-evidence: Credential synthesis and evidence fusion for the
// Chronos reputation engine.
//
// The synthesizer produces per-actor synthetic credentials carrying mass
// functions; the fusion engine discounts each by issuer reliability and
// combines them into a single belief state, projected into an IRV.

pub mod combination;
pub mod fusion;
pub mod synth;

// Re-export key types for ergonomic access from downstream crates.
pub use combination::{combine, combine_all, combine_with_conflict, condition, conflict};
pub use fusion::{tier_discount, type_weight, EvidenceFusionEngine, FusionConfig};
pub use synth::{CredentialSynthesizer, SynthesisConfig};
