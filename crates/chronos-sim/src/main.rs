// crates/chronos-sim/src/main.rs
//
// Binary entrypoint for the Chronos reputation simulation.
//
// Loads configuration, initializes tracing, registers the population,
// sets up the selected scenario, runs the tick scheduler, and optionally
// writes the final reputation snapshot as JSON.

mod config;
mod scheduler;

use std::path::Path;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chronos_core::ActorId;
use chronos_engine::{scenario_by_name, ReputationCore};
use config::SimConfig;
use scheduler::SimScheduler;

/// Chronos reputation engine simulation.
#[derive(Parser, Debug)]
#[command(name = "chronos-sim", version = "0.1.0", about = "Chronos multi-agent reputation simulation")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "chronos.toml")]
    config: String,

    /// Population size (overrides the config file).
    #[arg(long)]
    actors: Option<u32>,

    /// Number of ticks (overrides the config file).
    #[arg(long)]
    steps: Option<u64>,

    /// Scenario: baseline, sleeper, transgression, or collusion.
    #[arg(long)]
    scenario: Option<String>,

    /// Seed for the scenario and every engine generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final snapshot as JSON to this path.
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load before tracing starts so the configured level can seed the filter.
    let loaded = SimConfig::load(&args.config);
    let mut sim_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => SimConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&sim_config.log_level)),
        )
        .init();

    match &loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", args.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            args.config,
            e
        ),
    }

    // CLI flags override the config file values.
    if let Some(actors) = args.actors {
        sim_config.actors = actors;
    }
    if let Some(steps) = args.steps {
        sim_config.steps = steps;
    }
    if let Some(scenario) = args.scenario {
        sim_config.scenario = scenario;
    }
    if let Some(seed) = args.seed {
        sim_config.reseed(seed);
    }
    if let Some(path) = args.snapshot {
        sim_config.snapshot_path = Some(path);
    }

    tracing::info!("Chronos reputation simulation v0.1.0");
    tracing::info!("Actors: {}", sim_config.actors);
    tracing::info!("Steps: {}", sim_config.steps);
    tracing::info!("Scenario: {}", sim_config.scenario);
    tracing::info!(
        "Isolation threshold: {}, fan-out: {}, recompute interval: {}",
        sim_config.core.isolation_threshold,
        sim_config.core.interaction.fan_out,
        sim_config.core.interaction.recompute_interval
    );

    let mut core = ReputationCore::new(sim_config.core.clone())?;
    for id in 0..sim_config.actors {
        core.register(ActorId(id), false);
    }

    let mut scenario = scenario_by_name(&sim_config.scenario)?;
    let mut rng = StdRng::seed_from_u64(sim_config.seed);
    scenario.setup(&mut core, &mut rng)?;
    tracing::info!(
        "Scenario {} scripts {} actors",
        scenario.name(),
        scenario.cohort().len()
    );

    let mut scheduler = SimScheduler::new(
        sim_config.steps,
        sim_config.log_every,
        sim_config.core.interaction.recompute_interval,
    );
    let summary = scheduler.run(&mut core, scenario.as_mut(), &mut rng)?;

    tracing::info!(
        "Run complete: {} steps, {} active, {} isolated",
        summary.steps,
        summary.active,
        summary.isolated
    );
    match summary.mean_detection_step {
        Some(step) => tracing::info!(
            "Detection: rate {:.3}, mean step {:.1} over {} scripted actors",
            summary.detection_rate,
            step,
            summary.cohort
        ),
        None if summary.cohort > 0 => {
            tracing::info!("Detection: none of {} scripted actors isolated", summary.cohort)
        }
        None => {}
    }
    tracing::info!(
        "Reputation: mean {:.4}, std {:.4}, p10 {:.4}, p50 {:.4}, p90 {:.4}, gini {:.4}, partition stability {:.4}",
        summary.reputation.mean,
        summary.reputation.std,
        summary.reputation.p10,
        summary.reputation.p50,
        summary.reputation.p90,
        summary.gini,
        summary.stability
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &sim_config.snapshot_path {
        core.snapshot().write_json(Path::new(path))?;
        tracing::info!("Snapshot written to {}", path);
    }

    Ok(())
}
