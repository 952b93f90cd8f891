#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Cave In session.

mod config;
mod simulation;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use cave_in_core::{AiController, Grid};
use cave_in_system_pathfinding::Agent;
use cave_in_world::{Difficulty, World};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{config::SimulationConfig, simulation::Simulation};

/// Runs the autonomous resource collector on a simulated cave.
#[derive(Debug, Parser)]
#[command(name = "cave-in", version, about)]
struct Args {
    /// TOML file providing world, pathfinding and loop settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Text layout to start from instead of a generated world.
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,
    /// Maximum number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Seed for resource and obstacle placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Edge length of a generated world.
    #[arg(long)]
    size: Option<u32>,
    /// Obstacle placement rules.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,
    /// Run the world without an agent.
    #[arg(long)]
    no_agent: bool,
    /// Format of the final report printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Entry point for the Cave In command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let world = build_world(&config, args.layout.as_deref())?;
    let controller: Option<Box<dyn AiController>> = if args.no_agent {
        None
    } else {
        Some(Box::new(Agent::new(config.pathfinding)))
    };

    tracing::info!(
        seed = config.world.seed,
        size = config.world.size,
        ticks = config.simulation.ticks,
        "starting simulation"
    );
    let mut simulation = Simulation::new(
        world,
        controller,
        Duration::from_millis(config.simulation.tick_ms),
    );
    let summary = simulation.run(config.simulation.ticks);
    tracing::info!(
        ticks = summary.ticks_run,
        collected = summary.resources_collected,
        cleared = summary.obstacles_cleared,
        "simulation finished"
    );

    match args.report {
        ReportFormat::Text => println!("{summary}"),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        ),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(config: &mut SimulationConfig, args: &Args) {
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(size) = args.size {
        config.world.size = size;
    }
    if let Some(difficulty) = args.difficulty {
        config.world.difficulty = difficulty.into();
    }
}

fn build_world(config: &SimulationConfig, layout: Option<&std::path::Path>) -> Result<World> {
    let Some(path) = layout else {
        return Ok(World::new(config.world));
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let grid = Grid::parse(&contents)
        .with_context(|| format!("failed to parse layout {}", path.display()))?;
    World::from_layout(grid, config.world)
        .with_context(|| format!("layout {} is not playable", path.display()))
}
