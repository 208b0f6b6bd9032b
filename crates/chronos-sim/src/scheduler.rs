// crates/chronos-sim/src/scheduler.rs
//
// Tick scheduler for the Chronos simulation.
//
// Drives the scenario and the reputation core for a fixed number of ticks,
// tracks time-to-detection of the scenario cohort, and logs community
// recompute boundaries and periodic tick summaries.

use rand::rngs::StdRng;
use serde::Serialize;

use chronos_core::ChronosError;
use chronos_engine::{DetectionTracker, DistributionSummary, ReputationCore, Scenario, TickReport};

/// End-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub steps: u64,
    pub active: usize,
    pub isolated: usize,
    pub cohort: usize,
    pub mean_detection_step: Option<f64>,
    pub detection_rate: f64,
    pub reputation: DistributionSummary,
    pub gini: f64,
    /// 1 - std of recent partition modularity.
    pub stability: f64,
}

/// Scheduler that runs the simulation one tick at a time.
pub struct SimScheduler {
    /// Number of ticks to run.
    total_steps: u64,
    /// Ticks between info-level summaries.
    log_every: u64,
    /// Ticks between community recomputes.
    recompute_interval: u64,
}

impl SimScheduler {
    pub fn new(total_steps: u64, log_every: u64, recompute_interval: u64) -> Self {
        Self {
            total_steps,
            log_every: log_every.max(1),
            recompute_interval: recompute_interval.max(1),
        }
    }

    /// Run every tick: inject the scenario's scripted interactions, advance
    /// the core, and observe the cohort for detection.
    pub fn run(
        &mut self,
        core: &mut ReputationCore,
        scenario: &mut dyn Scenario,
        rng: &mut StdRng,
    ) -> Result<RunSummary, ChronosError> {
        tracing::info!(
            "Scheduler started ({} steps, scenario={})",
            self.total_steps,
            scenario.name()
        );
        let mut tracker = DetectionTracker::new(scenario.cohort(), core.config().isolation_threshold);

        for _ in 0..self.total_steps {
            let step = core.step() + 1;
            scenario.inject(core, step, rng)?;
            let report = core.tick()?;
            tracker.observe_records(core.registry().iter(), report.step);
            self.log_tick(core, &report);
        }

        let snapshot = core.snapshot();
        Ok(RunSummary {
            scenario: scenario.name().to_string(),
            steps: snapshot.step,
            active: core.registry().active_count(),
            isolated: snapshot.isolated_count(),
            cohort: tracker.targets().len(),
            mean_detection_step: tracker.mean_detection_step(),
            detection_rate: tracker.detection_rate(),
            reputation: core.reputation_summary(),
            gini: core.reputation_gini(),
            stability: core.interactions().history().stability_score(),
        })
    }

    fn log_tick(&self, core: &ReputationCore, report: &TickReport) {
        if report.step % self.recompute_interval == 0 {
            let (communities, modularity) = core
                .interactions()
                .history()
                .latest()
                .map(|s| (s.community_count, s.modularity))
                .unwrap_or((0, 0.0));
            tracing::info!(
                "=== RECOMPUTE BOUNDARY === (step {}, {} communities, {} suspect actors, modularity {:.4})",
                report.step,
                communities,
                core.interactions().suspect_actors().len(),
                modularity
            );
        }
        if report.step % self.log_every == 0 {
            tracing::info!(
                "Step {}: {} active, {} newly isolated, mean reputation {:.4}, {} alarms",
                report.step,
                report.active,
                report.newly_isolated.len(),
                report.mean_reputation,
                report.alarms
            );
        } else {
            tracing::trace!(
                "Step {}: {} active, mean reputation {:.4}",
                report.step,
                report.active,
                report.mean_reputation
            );
        }
    }
}
