// crates/chronos-evidence/src/fusion.rs
//
// Evidence fusion: weight each credential's mass function by issuer
// reliability, discount it, combine the results, and project the fused
// belief state into the reputation-evidence vector.

use serde::{Deserialize, Serialize};

use chronos_core::{ActorId, Credential, CredentialType, Irv, IssuerTier, MassFunction};

use crate::combination::combine_all;

/// Lower bound of the effective credential weight.
pub const MIN_WEIGHT: f64 = 0.01;

/// Configuration for the fusion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Belief-entropy ceiling (eta). Credentials above it are down-weighted
    /// by `eta / entropy`. Default: 2.5.
    pub entropy_ceiling: f64,
    /// Fraction removed from the weight of a revoked credential. Default: 0.10.
    pub revocation_penalty: f64,
    /// Weight lost per certificate-chain hop. Default: 0.05.
    pub depth_penalty: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            entropy_ceiling: 2.5,
            revocation_penalty: 0.10,
            depth_penalty: 0.05,
        }
    }
}

/// Reliability weight of a credential type.
pub fn type_weight(kind: CredentialType) -> f64 {
    match kind {
        CredentialType::Kyc => 1.00,
        CredentialType::DidDocument => 0.85,
        CredentialType::Behavioral => 0.90,
        CredentialType::Delegated => 0.70,
        CredentialType::Governance => 0.75,
    }
}

/// Reliability discount of an issuer tier.
pub fn tier_discount(tier: IssuerTier) -> f64 {
    match tier {
        IssuerTier::Root => 1.00,
        IssuerTier::Intermediate => 0.90,
        IssuerTier::Leaf => 0.75,
    }
}

/// Fuses credential evidence into a per-actor [`Irv`].
///
/// The engine is stateless apart from its configuration, so one instance can
/// be shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct EvidenceFusionEngine {
    config: FusionConfig,
}

impl EvidenceFusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Effective reliability weight of a credential, in [`MIN_WEIGHT`, 1].
    ///
    /// weight = issuer_trust · type_weight · tier_discount
    ///          · max(0, 1 - chain_depth · depth_penalty),
    /// reduced further by the revocation penalty and by `eta / entropy` when
    /// the credential's belief entropy exceeds the ceiling.
    pub fn effective_weight(&self, credential: &Credential) -> f64 {
        let depth_factor =
            (1.0 - credential.chain_depth as f64 * self.config.depth_penalty).max(0.0);
        let mut weight = credential.issuer_trust
            * type_weight(credential.kind)
            * tier_discount(credential.issuer_tier)
            * depth_factor;

        if credential.revoked {
            weight *= 1.0 - self.config.revocation_penalty;
        }

        let entropy = credential.mass.belief_entropy();
        if entropy > self.config.entropy_ceiling {
            weight *= self.config.entropy_ceiling / entropy;
        }

        weight.clamp(MIN_WEIGHT, 1.0)
    }

    /// Discount every credential by its effective weight and combine the
    /// results left to right. `None` for an empty slice.
    pub fn fuse(&self, credentials: &[Credential]) -> Option<MassFunction> {
        let discounted: Vec<MassFunction> = credentials
            .iter()
            .map(|c| {
                let w = self.effective_weight(c);
                if w < 1.0 {
                    c.mass.discount(w)
                } else {
                    c.mass
                }
            })
            .collect();
        combine_all(&discounted)
    }

    /// Fuse an actor's credentials into its evidence vector.
    ///
    /// Non-revoked credentials are preferred; when every credential is
    /// revoked, all of them are used. An empty input yields [`Irv::zero`].
    pub fn process(&self, actor: ActorId, credentials: &[Credential]) -> Irv {
        let active: Vec<Credential> = credentials.iter().filter(|c| !c.revoked).cloned().collect();
        let working = if active.is_empty() { credentials } else { &active[..] };

        match self.fuse(working) {
            Some(fused) => {
                let irv = Irv::from_mass(&fused);
                tracing::trace!(
                    "Fused {} credentials for {}: bel(trusted)={:.4}",
                    working.len(),
                    actor,
                    irv.belief_trusted
                );
                irv
            }
            None => Irv::zero(),
        }
    }
}
