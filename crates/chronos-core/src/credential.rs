// crates/chronos-core/src/credential.rs
//
// Synthetic credential records.
//
// Credentials are immutable evidence records with a pre-assigned mass
// function. They are not signed certificates: revocation is a flag fixed at
// creation time and nothing mutates a record after synthesis.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::ActorId;
use crate::mass::MassFunction;

/// Kind of credential, which determines its attribute schema and fusion weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialType {
    /// Know-your-customer identity proof.
    Kyc,
    /// Decentralized identifier document.
    DidDocument,
    /// Behavioral history attestation.
    Behavioral,
    /// Authority delegated from another actor.
    Delegated,
    /// Governance participation record.
    Governance,
}

impl CredentialType {
    pub const ALL: [CredentialType; 5] = [
        CredentialType::Kyc,
        CredentialType::DidDocument,
        CredentialType::Behavioral,
        CredentialType::Delegated,
        CredentialType::Governance,
    ];

    /// Three-letter code used in credential identifiers.
    pub fn code(self) -> &'static str {
        match self {
            CredentialType::Kyc => "KYC",
            CredentialType::DidDocument => "DID",
            CredentialType::Behavioral => "BEH",
            CredentialType::Delegated => "DEL",
            CredentialType::Governance => "GOV",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Position of the issuer in the certificate hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuerTier {
    Root,
    Intermediate,
    Leaf,
}

impl IssuerTier {
    pub const ALL: [IssuerTier; 3] = [IssuerTier::Root, IssuerTier::Intermediate, IssuerTier::Leaf];

    /// Minimum chain depth for credentials issued at this tier.
    pub fn base_chain_depth(self) -> u32 {
        match self {
            IssuerTier::Root => 0,
            IssuerTier::Intermediate => 1,
            IssuerTier::Leaf => 2,
        }
    }
}

/// Opaque attribute value carried in a credential payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

/// An immutable synthetic credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Deterministic identifier, e.g. "vc-0042-3-KYC".
    pub id: String,
    pub kind: CredentialType,
    pub issuer_tier: IssuerTier,
    /// Issuer trust score in [0, 1].
    pub issuer_trust: f64,
    /// Actor the credential speaks about.
    pub subject: ActorId,
    pub revoked: bool,
    /// Type-specific payload keys.
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Evidence mass attached at issuance.
    pub mass: MassFunction,
    pub issued_at: DateTime<Utc>,
    /// Certificate-chain depth (0 for root-issued).
    pub chain_depth: u32,
}
