// crates/chronos-sim/src/config.rs
//
// Runtime configuration for the Chronos simulation.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use chronos_engine::CoreConfig;

/// Runtime configuration for a simulation run.
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Population size.
    #[serde(default = "default_actors")]
    pub actors: u32,

    /// Number of ticks to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Scenario: "baseline", "sleeper", "transgression", or "collusion".
    #[serde(default = "default_scenario")]
    pub scenario: String,

    /// Seed of the scenario generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// RUST_LOG takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log a tick summary every this many ticks.
    #[serde(default = "default_log_every")]
    pub log_every: u64,

    /// Where to write the final JSON snapshot, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Engine parameters; the `[core]` table and its sub-tables.
    #[serde(default)]
    pub core: CoreConfig,
}

fn default_actors() -> u32 {
    1000
}

fn default_steps() -> u64 {
    500
}

fn default_scenario() -> String {
    "baseline".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_every() -> u64 {
    50
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            actors: default_actors(),
            steps: default_steps(),
            scenario: default_scenario(),
            seed: default_seed(),
            log_level: default_log_level(),
            log_every: default_log_every(),
            snapshot_path: None,
            core: CoreConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reseed the scenario and every engine generator from one seed.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.core.synthesis.seed_offset = seed;
        self.core.interaction.seed = seed;
        self.core.dynamics.seed = seed.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: SimConfig = toml::from_str("").unwrap();
        assert_eq!(config.actors, 1000);
        assert_eq!(config.steps, 500);
        assert_eq!(config.scenario, "baseline");
        assert_eq!(config.log_every, 50);
        assert!(config.snapshot_path.is_none());
        assert_eq!(config.core.isolation_threshold, 0.4);
    }

    #[test]
    fn nested_tables_are_partial() {
        let config: SimConfig = toml::from_str(
            r#"
            actors = 200
            scenario = "collusion"

            [core]
            isolation_threshold = 0.35

            [core.interaction]
            fan_out = 4

            [core.dynamics]
            sigma = 0.05
            "#,
        )
        .unwrap();
        assert_eq!(config.actors, 200);
        assert_eq!(config.scenario, "collusion");
        assert_eq!(config.core.isolation_threshold, 0.35);
        assert_eq!(config.core.interaction.fan_out, 4);
        assert_eq!(config.core.interaction.recompute_interval, 10);
        assert_eq!(config.core.dynamics.sigma, 0.05);
        assert_eq!(config.core.dynamics.theta0, 0.30);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(SimConfig::load("/nonexistent/chronos.toml").is_err());
    }

    #[test]
    fn reseed_touches_every_generator() {
        let mut config = SimConfig::default();
        config.reseed(7);
        assert_eq!(config.seed, 7);
        assert_eq!(config.core.synthesis.seed_offset, 7);
        assert_eq!(config.core.interaction.seed, 7);
        assert_eq!(config.core.dynamics.seed, 8);
    }
}
