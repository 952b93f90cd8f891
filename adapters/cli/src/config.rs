use std::{fs, path::Path};

use anyhow::{Context, Result};
use cave_in_system_pathfinding::PathfindingConfig;
use cave_in_world::WorldConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_TICKS: u64 = 1_000;
const DEFAULT_TICK_MS: u64 = 20;

/// Complete configuration of a headless simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SimulationConfig {
    /// World construction parameters.
    pub(crate) world: WorldConfig,
    /// Agent and route planning parameters.
    pub(crate) pathfinding: PathfindingConfig,
    /// Tick loop parameters.
    pub(crate) simulation: LoopConfig,
}

/// Parameters of the fixed-step tick loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LoopConfig {
    /// Maximum number of ticks to simulate.
    pub(crate) ticks: u64,
    /// Simulated duration of a single tick in milliseconds.
    pub(crate) tick_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl SimulationConfig {
    /// Parses a TOML document. Missing tables and keys keep their defaults.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse simulation config toml contents")
    }

    /// Reads and parses a TOML configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid simulation config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_in_system_pathfinding::BudgetSearch;
    use cave_in_world::Difficulty;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.world.size, 10);
        assert_eq!(config.pathfinding.obstacle_value, 10);
        assert_eq!(config.pathfinding.max_search_states, 20_000);
        assert_eq!(config.simulation.tick_ms, 20);
    }

    #[test]
    fn partial_tables_override_selected_fields() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [world]
            seed = 99
            difficulty = "normal"

            [pathfinding]
            obstacle_value = 4
            budget_search = "exhaustive"
            max_search_states = 1000

            [simulation]
            ticks = 50
            "#,
        )
        .expect("config parses");

        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.difficulty, Difficulty::Normal);
        assert_eq!(config.world.size, 10);
        assert_eq!(config.pathfinding.obstacle_value, 4);
        assert_eq!(config.pathfinding.budget_search, BudgetSearch::Exhaustive);
        assert_eq!(config.pathfinding.max_search_states, 1000);
        assert_eq!(config.pathfinding.visibility_radius, Some(4));
        assert_eq!(config.simulation.ticks, 50);
        assert_eq!(config.simulation.tick_ms, 20);
    }

    #[test]
    fn unknown_variants_are_rejected() {
        let error = SimulationConfig::from_toml_str("[world]\ndifficulty = \"brutal\"")
            .expect_err("unknown difficulty");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = SimulationConfig::load(Path::new("/nonexistent/cave-in.toml"))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/cave-in.toml"));
    }
}
