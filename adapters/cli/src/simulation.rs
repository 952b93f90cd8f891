use std::{fmt, time::Duration};

use cave_in_core::{AiController, Command, Event};
use cave_in_world::{self as world, query, AgentControls, World};
use serde::Serialize;

/// Fixed-step loop that advances the world and drives the active controller.
pub(crate) struct Simulation {
    world: World,
    controller: Option<Box<dyn AiController>>,
    tick: Duration,
    ticks_run: u64,
    idle_ticks: u64,
}

impl Simulation {
    /// Creates a simulation. Without a controller the world only ticks.
    pub(crate) fn new(
        world: World,
        controller: Option<Box<dyn AiController>>,
        tick: Duration,
    ) -> Self {
        Self {
            world,
            controller,
            tick,
            ticks_run: 0,
            idle_ticks: 0,
        }
    }

    /// Runs at most `ticks` ticks, stopping early once the board fills up.
    pub(crate) fn run(&mut self, ticks: u64) -> Summary {
        for _ in 0..ticks {
            if !self.step() {
                break;
            }
        }
        self.summary()
    }

    /// Advances one tick. Returns `false` once the session is over.
    fn step(&mut self) -> bool {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: self.tick }, &mut events);
        self.ticks_run += 1;
        if query::is_board_full(&self.world) {
            return false;
        }

        if let Some(controller) = self.controller.as_mut() {
            controller.update(&query::snapshot(&self.world));
            let mut controls = AgentControls::new(&mut self.world, &mut events);
            if !controller.should_use_action(&mut controls)
                && controller.get_movement(&mut controls).is_none()
            {
                self.idle_ticks += 1;
            }
        } else {
            self.idle_ticks += 1;
        }

        for event in &events {
            match event {
                Event::TimeAdvanced { .. } => {}
                Event::BoardFilled => tracing::info!(tick = self.ticks_run, "board filled"),
                other => tracing::debug!(tick = self.ticks_run, event = ?other, "world event"),
            }
        }

        !query::is_board_full(&self.world)
    }

    fn summary(&self) -> Summary {
        let stats = query::stats(&self.world);
        Summary {
            ticks_run: self.ticks_run,
            idle_ticks: self.idle_ticks,
            elapsed_ms: u64::try_from(query::elapsed(&self.world).as_millis()).unwrap_or(u64::MAX),
            resources_collected: stats.resources_collected,
            resources_held: stats.resources_held,
            obstacles_cleared: stats.obstacles_cleared,
            tiles_moved: stats.tiles_moved,
            board_full: query::is_board_full(&self.world),
            final_layout: query::grid(&self.world).to_string(),
        }
    }
}

/// Outcome of a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Summary {
    /// Ticks simulated, including the one that filled the board.
    pub(crate) ticks_run: u64,
    /// Ticks in which the agent neither moved nor interacted.
    pub(crate) idle_ticks: u64,
    /// Simulated time in milliseconds.
    pub(crate) elapsed_ms: u64,
    /// Resources collected over the run.
    pub(crate) resources_collected: u32,
    /// Resources still held at the end of the run.
    pub(crate) resources_held: u32,
    /// Obstacles cleared over the run.
    pub(crate) obstacles_cleared: u32,
    /// Successful single-cell moves.
    pub(crate) tiles_moved: u32,
    /// Whether the run ended because no empty cell remained.
    pub(crate) board_full: bool,
    /// Final grid rendered with layout glyphs.
    pub(crate) final_layout: String,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:      {} ({} idle)", self.ticks_run, self.idle_ticks)?;
        writeln!(f, "elapsed:    {} ms", self.elapsed_ms)?;
        writeln!(
            f,
            "collected:  {} ({} held)",
            self.resources_collected, self.resources_held
        )?;
        writeln!(f, "cleared:    {}", self.obstacles_cleared)?;
        writeln!(f, "moved:      {}", self.tiles_moved)?;
        writeln!(f, "board full: {}", self.board_full)?;
        write!(f, "{}", self.final_layout)
    }
}
