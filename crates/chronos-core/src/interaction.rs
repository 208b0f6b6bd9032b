// crates/chronos-core/src/interaction.rs
//
// Binary interaction outcomes exchanged between actors.

use serde::{Deserialize, Serialize};

/// Outcome of a single pairwise interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The interaction went badly for the initiator (encoded as 0).
    Negative,
    /// The interaction succeeded (encoded as 1).
    Positive,
}

impl Outcome {
    /// Decode from the 0/1 wire convention. Any non-zero value is positive.
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Outcome::Negative
        } else {
            Outcome::Positive
        }
    }

    /// 0.0 for negative, 1.0 for positive.
    pub fn as_f64(self) -> f64 {
        match self {
            Outcome::Negative => 0.0,
            Outcome::Positive => 1.0,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Outcome::Positive)
    }
}

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        if success {
            Outcome::Positive
        } else {
            Outcome::Negative
        }
    }
}
