// crates/chronos-evidence/src/synth.rs
//
// Synthetic credential generation for the Chronos reputation engine.
//
// Each actor's credentials are drawn from a generator seeded by the actor id
// and a configured offset, so a call never touches shared random state and
// identical inputs reproduce identical records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use chronos_core::{
    ActorId, AttributeValue, Credential, CredentialType, Hypothesis, IssuerTier, MassFunction,
};

/// Multiplier separating seed streams of different offsets.
const SEED_STRIDE: u64 = 100_003;

/// One year in seconds; bounds issuance back-dating and expiry horizons.
const ONE_YEAR_SECS: i64 = 31_536_000;

/// Configuration for credential synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Offset mixed into every per-actor seed. Default: 0.
    pub seed_offset: u64,
    /// Credentials generated per actor per step. Default: 5.
    pub credentials_per_step: usize,
    /// Revocation probability for honest actors. Default: 0.02.
    pub revocation_prob_honest: f64,
    /// Revocation probability for adversarial actors. Default: 0.35.
    pub revocation_prob_adversarial: f64,
    /// Reference "now" in unix seconds for issuance and expiry timestamps.
    pub reference_time: i64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed_offset: 0,
            credentials_per_step: 5,
            revocation_prob_honest: 0.02,
            revocation_prob_adversarial: 0.35,
            reference_time: 1_700_000_000,
        }
    }
}

/// How a single attribute value is drawn.
#[derive(Debug, Clone, Copy)]
enum AttributeKind {
    /// Truncated hex SHA-256 of random bits.
    Digest,
    /// Non-negative counter; wider range for adversaries.
    Counter,
    /// Small ratio/score; wider range for adversaries.
    Ratio,
    /// Uniform amount in [0, 1).
    Amount,
    /// Unix timestamp between one day and one year after the reference time.
    Expiry,
    /// 16-bit scope mask.
    Bitmask,
    /// Integer level 1..=3.
    Level,
    /// Risk band; HIGH appears only for adversaries.
    RiskBand,
    /// Uniform pick from a fixed vocabulary.
    Choice(&'static [&'static str]),
}

const KYC_SCHEMA: &[(&str, AttributeKind)] = &[
    ("identity_hash", AttributeKind::Digest),
    ("nationality_code", AttributeKind::Choice(&["VN", "US", "SG", "EU", "UK"])),
    ("risk_band", AttributeKind::RiskBand),
    ("kyc_level", AttributeKind::Level),
];

const DID_SCHEMA: &[(&str, AttributeKind)] = &[
    ("did_method", AttributeKind::Choice(&["did:web", "did:key", "did:ion", "did:ethr"])),
    ("pub_key_alg", AttributeKind::Choice(&["Ed25519", "secp256k1", "P-256"])),
    ("rotation_count", AttributeKind::Counter),
    ("linked_domain", AttributeKind::Choice(&["example.com", "defi.xyz", "anon.io"])),
];

const BEHAVIORAL_SCHEMA: &[(&str, AttributeKind)] = &[
    ("tx_count_30d", AttributeKind::Counter),
    ("avg_tx_value", AttributeKind::Amount),
    ("flagged_ratio", AttributeKind::Ratio),
    ("peer_score", AttributeKind::Ratio),
];

const DELEGATED_SCHEMA: &[(&str, AttributeKind)] = &[
    ("delegator_id", AttributeKind::Digest),
    ("delegation_depth", AttributeKind::Counter),
    ("scope_bitmask", AttributeKind::Bitmask),
    ("expiry_epoch", AttributeKind::Expiry),
];

const GOVERNANCE_SCHEMA: &[(&str, AttributeKind)] = &[
    ("dao_id", AttributeKind::Choice(&["dao_alpha", "dao_beta", "dao_gamma"])),
    ("vote_weight", AttributeKind::Ratio),
    ("proposal_count", AttributeKind::Counter),
    ("slash_count", AttributeKind::Counter),
];

fn schema(kind: CredentialType) -> &'static [(&'static str, AttributeKind)] {
    match kind {
        CredentialType::Kyc => KYC_SCHEMA,
        CredentialType::DidDocument => DID_SCHEMA,
        CredentialType::Behavioral => BEHAVIORAL_SCHEMA,
        CredentialType::Delegated => DELEGATED_SCHEMA,
        CredentialType::Governance => GOVERNANCE_SCHEMA,
    }
}

/// Issuer tier weights (root, intermediate, leaf) per credential type.
fn tier_weights(kind: CredentialType) -> [f64; 3] {
    match kind {
        CredentialType::Kyc => [0.40, 0.40, 0.20],
        CredentialType::DidDocument => [0.20, 0.45, 0.35],
        CredentialType::Behavioral => [0.05, 0.30, 0.65],
        CredentialType::Delegated => [0.10, 0.35, 0.55],
        CredentialType::Governance => [0.30, 0.50, 0.20],
    }
}

/// Issuer trust sampling range per tier.
fn tier_trust_range(tier: IssuerTier) -> (f64, f64) {
    match tier {
        IssuerTier::Root => (0.88, 1.00),
        IssuerTier::Intermediate => (0.70, 0.90),
        IssuerTier::Leaf => (0.45, 0.75),
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Generates synthetic credentials for actors.
#[derive(Debug, Clone, Default)]
pub struct CredentialSynthesizer {
    config: SynthesisConfig,
}

impl CredentialSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Seed of the private generator used for `actor`.
    pub fn actor_seed(&self, actor: ActorId) -> u64 {
        (actor.get() as u64).wrapping_add(self.config.seed_offset.wrapping_mul(SEED_STRIDE))
    }

    /// Generate exactly `count` credentials for `actor`.
    ///
    /// Credential types are drawn uniformly; issuer tiers follow a
    /// type-specific weighting. Adversarial actors get discounted issuer
    /// trust, a much higher revocation rate, noisier attributes, and mass
    /// concentrated on {untrusted}.
    pub fn generate(&self, actor: ActorId, count: usize, adversarial: bool) -> Vec<Credential> {
        let mut rng = StdRng::seed_from_u64(self.actor_seed(actor));
        let revocation_prob = if adversarial {
            self.config.revocation_prob_adversarial
        } else {
            self.config.revocation_prob_honest
        };

        (0..count)
            .map(|index| {
                let kind = CredentialType::ALL[rng.gen_range(0..CredentialType::ALL.len())];
                let issuer_tier = sample_tier(kind, &mut rng);
                let (lo, hi) = tier_trust_range(issuer_tier);
                let mut issuer_trust = round4(rng.gen_range(lo..=hi));
                if adversarial {
                    issuer_trust = round4(issuer_trust * rng.gen_range(0.5..0.85));
                }
                let revoked = rng.gen::<f64>() < revocation_prob;
                let attributes = self.build_attributes(kind, adversarial, &mut rng);
                let mass = if adversarial {
                    adversarial_mass(&mut rng)
                } else {
                    honest_mass(&mut rng)
                };
                let issued_secs = self.config.reference_time - rng.gen_range(0..ONE_YEAR_SECS);
                let issued_at = DateTime::<Utc>::from_timestamp(issued_secs, 0).unwrap_or_default();
                let chain_depth = issuer_tier.base_chain_depth() + rng.gen_range(0..=1);

                Credential {
                    id: format!("vc-{:04}-{}-{}", actor.get(), index, kind.code()),
                    kind,
                    issuer_tier,
                    issuer_trust,
                    subject: actor,
                    revoked,
                    attributes,
                    mass,
                    issued_at,
                    chain_depth,
                }
            })
            .collect()
    }

    fn build_attributes(
        &self,
        kind: CredentialType,
        adversarial: bool,
        rng: &mut StdRng,
    ) -> BTreeMap<String, AttributeValue> {
        schema(kind)
            .iter()
            .map(|&(key, attr)| {
                let value = match attr {
                    AttributeKind::Digest => {
                        let seed: u128 = rng.gen();
                        let digest = hex::encode(Sha256::digest(seed.to_be_bytes()));
                        AttributeValue::Text(digest[..32].to_string())
                    }
                    AttributeKind::Counter => {
                        let max = if adversarial { 200 } else { 50 };
                        AttributeValue::Integer(rng.gen_range(0..=max))
                    }
                    AttributeKind::Ratio => {
                        let max = if adversarial { 0.25 } else { 0.08 };
                        AttributeValue::Real(round4(rng.gen_range(0.0..max)))
                    }
                    AttributeKind::Amount => AttributeValue::Real(round4(rng.gen::<f64>())),
                    AttributeKind::Expiry => AttributeValue::Integer(
                        self.config.reference_time + rng.gen_range(86_400..ONE_YEAR_SECS),
                    ),
                    AttributeKind::Bitmask => AttributeValue::Integer(rng.gen::<u16>() as i64),
                    AttributeKind::Level => AttributeValue::Integer(rng.gen_range(1..=3)),
                    AttributeKind::RiskBand => {
                        let bands: &[&str] = if adversarial {
                            &["LOW", "MEDIUM", "HIGH"]
                        } else {
                            &["LOW", "MEDIUM"]
                        };
                        AttributeValue::Text(bands[rng.gen_range(0..bands.len())].to_string())
                    }
                    AttributeKind::Choice(pool) => {
                        AttributeValue::Text(pool[rng.gen_range(0..pool.len())].to_string())
                    }
                };
                (key.to_string(), value)
            })
            .collect()
    }
}

fn sample_tier(kind: CredentialType, rng: &mut StdRng) -> IssuerTier {
    match WeightedIndex::new(tier_weights(kind)) {
        Ok(dist) => IssuerTier::ALL[dist.sample(rng)],
        Err(_) => IssuerTier::Leaf,
    }
}

/// Mass concentrated on {trusted}, with small mass on {unknown} and the frame.
fn honest_mass(rng: &mut StdRng) -> MassFunction {
    let m_tr: f64 = rng.gen_range(0.50..0.78);
    let m_uk = rng.gen_range(0.04..0.18);
    let m_fr = rng.gen_range(0.03..0.10);
    let residual = (1.0 - m_tr - m_uk - m_fr).max(0.0);
    let m_un = residual * rng.gen_range(0.0..0.12);
    let m_tr_uk = residual * rng.gen_range(0.0..0.08);
    MassFunction::from_focal([
        (Hypothesis::TRUSTED, m_tr),
        (Hypothesis::UNTRUSTED, m_un),
        (Hypothesis::UNKNOWN, m_uk),
        (Hypothesis::TRUSTED_OR_UNKNOWN, m_tr_uk),
        (Hypothesis::FRAME, m_fr),
    ])
    .unwrap_or_default()
}

/// Mass concentrated on {untrusted}.
fn adversarial_mass(rng: &mut StdRng) -> MassFunction {
    let m_un: f64 = rng.gen_range(0.48..0.72);
    let m_uk = rng.gen_range(0.10..0.24);
    let m_fr = rng.gen_range(0.05..0.14);
    let residual = (1.0 - m_un - m_uk - m_fr).max(0.0);
    let m_tr = residual * rng.gen_range(0.0..0.08);
    let m_un_uk = residual * rng.gen_range(0.0..0.10);
    MassFunction::from_focal([
        (Hypothesis::TRUSTED, m_tr),
        (Hypothesis::UNTRUSTED, m_un),
        (Hypothesis::UNKNOWN, m_uk),
        (Hypothesis::UNTRUSTED_OR_UNKNOWN, m_un_uk),
        (Hypothesis::FRAME, m_fr),
    ])
    .unwrap_or_default()
}
