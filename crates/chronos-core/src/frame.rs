// crates/chronos-core/src/frame.rs
//
// Frame of discernment and hypothesis lattice for the Chronos evidence calculus.
//
// The frame is the fixed label set {trusted, untrusted, unknown}. Every
// hypothesis is a non-empty subset of the frame, encoded as a 3-bit mask, so
// the whole lattice is seven values known at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single label of the frame of discernment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Trusted,
    Untrusted,
    Unknown,
}

impl Label {
    /// All labels in canonical order.
    pub const ALL: [Label; 3] = [Label::Trusted, Label::Untrusted, Label::Unknown];

    /// Bit assigned to this label in a hypothesis mask.
    pub fn bit(self) -> u8 {
        match self {
            Label::Trusted => 0b001,
            Label::Untrusted => 0b010,
            Label::Unknown => 0b100,
        }
    }

    /// Position of this label in [`Label::ALL`].
    pub fn index(self) -> usize {
        match self {
            Label::Trusted => 0,
            Label::Untrusted => 1,
            Label::Unknown => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Trusted => "trusted",
            Label::Untrusted => "untrusted",
            Label::Unknown => "unknown",
        }
    }
}

/// A non-empty subset of the frame of discernment.
///
/// The empty set is unrepresentable: constructors return `None` for it, so
/// a mass function can never carry mass on the empty hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Hypothesis(u8);

impl Hypothesis {
    pub const TRUSTED: Hypothesis = Hypothesis(0b001);
    pub const UNTRUSTED: Hypothesis = Hypothesis(0b010);
    pub const UNKNOWN: Hypothesis = Hypothesis(0b100);
    pub const TRUSTED_OR_UNTRUSTED: Hypothesis = Hypothesis(0b011);
    pub const TRUSTED_OR_UNKNOWN: Hypothesis = Hypothesis(0b101);
    pub const UNTRUSTED_OR_UNKNOWN: Hypothesis = Hypothesis(0b110);
    /// The whole frame (total ignorance).
    pub const FRAME: Hypothesis = Hypothesis(0b111);

    /// Build a hypothesis from its bit mask. Returns `None` for the empty
    /// set or for bits outside the frame.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits == 0 || bits > 0b111 {
            None
        } else {
            Some(Hypothesis(bits))
        }
    }

    pub fn singleton(label: Label) -> Self {
        Hypothesis(label.bit())
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Number of labels in the hypothesis (1..=3).
    pub fn cardinality(self) -> u32 {
        self.0.count_ones()
    }

    pub fn contains(self, label: Label) -> bool {
        self.0 & label.bit() != 0
    }

    /// Set intersection; `None` when the two hypotheses are disjoint.
    pub fn intersection(self, other: Hypothesis) -> Option<Hypothesis> {
        Hypothesis::from_bits(self.0 & other.0)
    }

    pub fn intersects(self, other: Hypothesis) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_subset_of(self, other: Hypothesis) -> bool {
        self.0 & other.0 == self.0
    }

    /// Labels contained in this hypothesis, in canonical order.
    pub fn labels(self) -> impl Iterator<Item = Label> {
        Label::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

/// The seven non-empty hypotheses: singletons, then pairs, then the frame.
pub const LATTICE: [Hypothesis; 7] = [
    Hypothesis::TRUSTED,
    Hypothesis::UNTRUSTED,
    Hypothesis::UNKNOWN,
    Hypothesis::TRUSTED_OR_UNTRUSTED,
    Hypothesis::TRUSTED_OR_UNKNOWN,
    Hypothesis::UNTRUSTED_OR_UNKNOWN,
    Hypothesis::FRAME,
];

impl TryFrom<u8> for Hypothesis {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Hypothesis::from_bits(bits)
            .ok_or_else(|| format!("{bits:#05b} is not a non-empty subset of the frame"))
    }
}

impl From<Hypothesis> for u8 {
    fn from(h: Hypothesis) -> u8 {
        h.0
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Hypothesis::FRAME {
            return write!(f, "Θ");
        }
        let names: Vec<&str> = self.labels().map(Label::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
