// crates/chronos-engine/src/scenario.rs
//
// Scripted adversarial scenarios.
//
// A scenario picks its cohort once in `setup()` and then, before every tick,
// forces interactions through the core's scenario hook. Forced interactions
// only shape the interaction graph (and so the community partition); the
// cohort's credentials follow the registry's adversarial flag.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};

use chronos_core::{ActorId, ChronosError, Outcome};

use crate::pipeline::ReputationCore;

/// Names accepted by [`scenario_by_name`].
pub const SCENARIO_NAMES: [&str; 4] = ["baseline", "sleeper", "transgression", "collusion"];

/// An attack script driven by the run loop.
pub trait Scenario: Send {
    fn name(&self) -> &'static str;

    /// Choose the cohort and set its initial profile.
    fn setup(&mut self, core: &mut ReputationCore, rng: &mut StdRng) -> Result<(), ChronosError>;

    /// Force this step's scripted interactions. `step` is the 1-based step
    /// about to run.
    fn inject(
        &mut self,
        core: &mut ReputationCore,
        step: u64,
        rng: &mut StdRng,
    ) -> Result<(), ChronosError>;

    /// Actors the scenario scripts; the detection targets of the run.
    fn cohort(&self) -> BTreeSet<ActorId> {
        BTreeSet::new()
    }
}

/// Build a scenario with its default parameters.
pub fn scenario_by_name(name: &str) -> Result<Box<dyn Scenario>, ChronosError> {
    match name {
        "baseline" => Ok(Box::new(Baseline)),
        "sleeper" => Ok(Box::new(Sleeper::default())),
        "transgression" => Ok(Box::new(Transgression::default())),
        "collusion" => Ok(Box::new(Collusion::default())),
        other => Err(ChronosError::InvalidConfig(format!(
            "unknown scenario '{}' (expected one of {})",
            other,
            SCENARIO_NAMES.join(", ")
        ))),
    }
}

/// Uniformly pick `amount` distinct registered actors.
fn pick_cohort(core: &ReputationCore, amount: usize, rng: &mut StdRng) -> BTreeSet<ActorId> {
    let ids = core.registry().ids();
    let amount = amount.min(ids.len());
    index::sample(rng, ids.len(), amount)
        .iter()
        .map(|i| ids[i])
        .collect()
}

/// Cohort size as a fraction of the population, with a floor.
fn fraction_of(core: &ReputationCore, fraction: f64, floor: usize) -> usize {
    let n = core.registry().len();
    ((fraction * n as f64) as usize).max(floor).min(n)
}

/// Each active cohort member forces one interaction with a random active peer.
fn endorse_random_peers(
    core: &mut ReputationCore,
    cohort: &BTreeSet<ActorId>,
    outcome: Outcome,
    rng: &mut StdRng,
) {
    let active = core.active_ids();
    for &actor in cohort {
        if !active.contains(&actor) {
            continue;
        }
        let targets: Vec<ActorId> = active.iter().copied().filter(|&t| t != actor).collect();
        if let Some(&target) = targets.choose(rng) {
            core.force_interaction(actor, target, outcome);
        }
    }
}

fn mark(core: &mut ReputationCore, cohort: &BTreeSet<ActorId>, adversarial: bool) -> Result<(), ChronosError> {
    for &actor in cohort {
        core.set_adversarial(actor, adversarial)?;
    }
    Ok(())
}

/// No injection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl Scenario for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn setup(&mut self, _core: &mut ReputationCore, _rng: &mut StdRng) -> Result<(), ChronosError> {
        Ok(())
    }

    fn inject(&mut self, _core: &mut ReputationCore, _step: u64, _rng: &mut StdRng) -> Result<(), ChronosError> {
        Ok(())
    }
}

/// Adversaries build credit with positive interactions, then defect.
#[derive(Debug, Clone)]
pub struct Sleeper {
    /// Number of adversaries. Default: 20.
    pub adversaries: usize,
    /// First step of negative interactions. Default: 201.
    pub defect_step: u64,
    cohort: BTreeSet<ActorId>,
}

impl Default for Sleeper {
    fn default() -> Self {
        Self::new(20, 201)
    }
}

impl Sleeper {
    pub fn new(adversaries: usize, defect_step: u64) -> Self {
        Self {
            adversaries,
            defect_step,
            cohort: BTreeSet::new(),
        }
    }
}

impl Scenario for Sleeper {
    fn name(&self) -> &'static str {
        "sleeper"
    }

    fn setup(&mut self, core: &mut ReputationCore, rng: &mut StdRng) -> Result<(), ChronosError> {
        self.cohort = pick_cohort(core, self.adversaries, rng);
        mark(core, &self.cohort, true)
    }

    fn inject(&mut self, core: &mut ReputationCore, step: u64, rng: &mut StdRng) -> Result<(), ChronosError> {
        let outcome = Outcome::from(step < self.defect_step);
        endorse_random_peers(core, &self.cohort, outcome, rng);
        Ok(())
    }

    fn cohort(&self) -> BTreeSet<ActorId> {
        self.cohort.clone()
    }
}

/// Adversaries behave, misbehave, then reform.
#[derive(Debug, Clone)]
pub struct Transgression {
    /// Share of the population in the cohort (at least one). Default: 0.20.
    pub fraction: f64,
    /// First misbehaving step. Default: 101.
    pub misbehave_start: u64,
    /// First reformed step. Default: 201.
    pub reform_start: u64,
    cohort: BTreeSet<ActorId>,
}

impl Default for Transgression {
    fn default() -> Self {
        Self::new(0.20, 101, 201)
    }
}

impl Transgression {
    pub fn new(fraction: f64, misbehave_start: u64, reform_start: u64) -> Self {
        Self {
            fraction,
            misbehave_start,
            reform_start,
            cohort: BTreeSet::new(),
        }
    }
}

impl Scenario for Transgression {
    fn name(&self) -> &'static str {
        "transgression"
    }

    fn setup(&mut self, core: &mut ReputationCore, rng: &mut StdRng) -> Result<(), ChronosError> {
        let amount = fraction_of(core, self.fraction, 1);
        self.cohort = pick_cohort(core, amount, rng);
        mark(core, &self.cohort, true)
    }

    fn inject(&mut self, core: &mut ReputationCore, step: u64, rng: &mut StdRng) -> Result<(), ChronosError> {
        let outcome = if step < self.misbehave_start {
            Outcome::Positive
        } else if step < self.reform_start {
            Outcome::Negative
        } else {
            if step == self.reform_start {
                tracing::debug!("Transgression cohort reforms at step {}", step);
            }
            mark(core, &self.cohort, false)?;
            Outcome::Positive
        };
        endorse_random_peers(core, &self.cohort, outcome, rng);
        Ok(())
    }

    fn cohort(&self) -> BTreeSet<ActorId> {
        self.cohort.clone()
    }
}

/// Colluders farm reputation by endorsing each other every step. Their
/// credentials stay honest; only the graph structure gives them away.
#[derive(Debug, Clone)]
pub struct Collusion {
    /// Share of the population in the ring (at least two). Default: 0.20.
    pub fraction: f64,
    cohort: BTreeSet<ActorId>,
}

impl Default for Collusion {
    fn default() -> Self {
        Self::new(0.20)
    }
}

impl Collusion {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction,
            cohort: BTreeSet::new(),
        }
    }
}

impl Scenario for Collusion {
    fn name(&self) -> &'static str {
        "collusion"
    }

    fn setup(&mut self, core: &mut ReputationCore, rng: &mut StdRng) -> Result<(), ChronosError> {
        let amount = fraction_of(core, self.fraction, 2);
        self.cohort = pick_cohort(core, amount, rng);
        mark(core, &self.cohort, false)
    }

    fn inject(&mut self, core: &mut ReputationCore, _step: u64, _rng: &mut StdRng) -> Result<(), ChronosError> {
        let active = core.active_ids();
        let ring: Vec<ActorId> = self
            .cohort
            .iter()
            .copied()
            .filter(|a| active.contains(a))
            .collect();
        for &source in &ring {
            for &target in &ring {
                if source != target {
                    core.force_interaction(source, target, Outcome::Positive);
                }
            }
        }
        Ok(())
    }

    fn cohort(&self) -> BTreeSet<ActorId> {
        self.cohort.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use rand::SeedableRng;

    fn core_with(n: u32) -> ReputationCore {
        let mut core = ReputationCore::new(CoreConfig::default()).unwrap();
        for i in 0..n {
            core.register(ActorId(i), false);
        }
        core
    }

    #[test]
    fn lookup_by_name() {
        for name in SCENARIO_NAMES {
            assert_eq!(scenario_by_name(name).unwrap().name(), name);
        }
        assert!(matches!(
            scenario_by_name("sybil"),
            Err(ChronosError::InvalidConfig(_))
        ));
    }

    #[test]
    fn sleeper_marks_cohort_adversarial() {
        let mut core = core_with(30);
        let mut rng = StdRng::seed_from_u64(1);
        let mut scenario = Sleeper::new(5, 3);
        scenario.setup(&mut core, &mut rng).unwrap();
        assert_eq!(scenario.cohort().len(), 5);
        assert_eq!(core.registry().adversarial_ids().len(), 5);

        scenario.inject(&mut core, 1, &mut rng).unwrap();
        let graph = core.interactions().graph();
        assert_eq!(graph.edge_count(), 5);
        for actor in scenario.cohort() {
            let out: Vec<_> = graph.edges().filter(|(s, _, _)| *s == actor).collect();
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].2.last_outcome, Outcome::Positive);
        }
    }

    #[test]
    fn sleeper_defects_at_configured_step() {
        let mut core = core_with(3);
        let mut rng = StdRng::seed_from_u64(2);
        let mut scenario = Sleeper::new(1, 3);
        scenario.setup(&mut core, &mut rng).unwrap();
        scenario.inject(&mut core, 3, &mut rng).unwrap();
        let (_, _, edge) = core.interactions().graph().edges().next().unwrap();
        assert_eq!(edge.last_outcome, Outcome::Negative);
    }

    #[test]
    fn cohort_never_exceeds_population() {
        let mut core = core_with(4);
        let mut rng = StdRng::seed_from_u64(3);
        let mut scenario = Sleeper::default();
        scenario.setup(&mut core, &mut rng).unwrap();
        assert_eq!(scenario.cohort().len(), 4);
    }

    #[test]
    fn transgression_reforms() {
        let mut core = core_with(10);
        let mut rng = StdRng::seed_from_u64(4);
        let mut scenario = Transgression::new(0.2, 3, 5);
        scenario.setup(&mut core, &mut rng).unwrap();
        assert_eq!(scenario.cohort().len(), 2);
        assert_eq!(core.registry().adversarial_ids().len(), 2);

        scenario.inject(&mut core, 4, &mut rng).unwrap();
        assert_eq!(core.registry().adversarial_ids().len(), 2);
        scenario.inject(&mut core, 5, &mut rng).unwrap();
        assert!(core.registry().adversarial_ids().is_empty());
    }

    #[test]
    fn collusion_forms_a_complete_ring() {
        let mut core = core_with(20);
        let mut rng = StdRng::seed_from_u64(5);
        let mut scenario = Collusion::default();
        scenario.setup(&mut core, &mut rng).unwrap();
        assert_eq!(scenario.cohort().len(), 4);
        assert!(core.registry().adversarial_ids().is_empty());

        scenario.inject(&mut core, 1, &mut rng).unwrap();
        scenario.inject(&mut core, 2, &mut rng).unwrap();
        let graph = core.interactions().graph();
        assert_eq!(graph.edge_count(), 12);
        assert!(graph.edges().all(|(_, _, e)| e.count == 2));
    }

    #[test]
    fn collusion_floor_is_two() {
        let mut core = core_with(5);
        let mut rng = StdRng::seed_from_u64(6);
        let mut scenario = Collusion::default();
        scenario.setup(&mut core, &mut rng).unwrap();
        assert_eq!(scenario.cohort().len(), 2);
    }
}
