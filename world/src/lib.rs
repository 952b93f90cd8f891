#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cave In.
//!
//! The world owns every grid mutation: agent movement, resource collection,
//! obstacle clearing, and the spawning that follows a collection. Everything
//! else observes it through [`query`] snapshots.

mod controls;
mod placement;

use std::time::Duration;

use cave_in_core::{
    AgentSnapshot, Cell, Command, Direction, Event, Grid, GridQuery, Position, Stats,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use controls::AgentControls;

const DEFAULT_GRID_SIZE: u32 = 10;
const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

const RESOURCE_STREAM_LABEL: &str = "resources";
const OBSTACLE_STREAM_LABEL: &str = "obstacles";

/// Rules applied when placing new obstacles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Obstacles are only placed where they cannot wall resources off.
    #[default]
    Easy,
    /// Obstacles land on any empty cell.
    Normal,
}

/// Parameters used to construct a fresh world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of cells along each edge of the square grid.
    pub size: u32,
    /// Obstacle placement rules.
    pub difficulty: Difficulty,
    /// Seed from which every random stream is derived.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            difficulty: Difficulty::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Errors raised when adopting a prepared layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The layout did not place the agent.
    #[error("layout does not contain an agent")]
    MissingAgent,
    /// The layout placed more than one agent.
    #[error("layout contains {count} agents, expected exactly one")]
    MultipleAgents {
        /// Number of agent glyphs found.
        count: usize,
    },
}

/// Represents the authoritative Cave In world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    grid: Grid,
    agent: AgentSnapshot,
    stats: Stats,
    clock: Duration,
    tick_index: u64,
    board_full: bool,
    resource_rng: ChaCha8Rng,
    obstacle_rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world with the agent centred and the first resource spawned.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let mut grid = Grid::square(config.size);
        let center = i32::try_from(config.size / 2).unwrap_or(0);
        let agent = AgentSnapshot {
            position: Position::new(center, center),
            facing: Direction::Down,
        };
        grid.set(agent.position, Cell::Agent);

        let mut world = Self::assemble(config, grid, agent);
        let mut events = Vec::new();
        world.spawn_resource(&mut events);
        world
    }

    /// Adopts a prepared layout. The configured size is ignored in favour of
    /// the layout's own dimensions.
    pub fn from_layout(grid: Grid, config: WorldConfig) -> Result<Self, WorldError> {
        let agents = grid.positions_of(Cell::Agent);
        let position = match agents.as_slice() {
            [] => return Err(WorldError::MissingAgent),
            [position] => *position,
            _ => {
                return Err(WorldError::MultipleAgents {
                    count: agents.len(),
                })
            }
        };

        let agent = AgentSnapshot {
            position,
            facing: Direction::Down,
        };
        let mut world = Self::assemble(config, grid, agent);
        let mut events = Vec::new();
        world.refresh_board_state(&mut events);
        Ok(world)
    }

    fn assemble(config: WorldConfig, grid: Grid, agent: AgentSnapshot) -> Self {
        Self {
            config,
            grid,
            agent,
            stats: Stats::default(),
            clock: Duration::ZERO,
            tick_index: 0,
            board_full: false,
            resource_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(
                config.seed,
                RESOURCE_STREAM_LABEL,
            )),
            obstacle_rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(
                config.seed,
                OBSTACLE_STREAM_LABEL,
            )),
        }
    }

    fn move_agent(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.agent.facing != direction {
            self.agent.facing = direction;
            out_events.push(Event::AgentTurned { facing: direction });
        }

        let from = self.agent.position;
        let to = from.step(direction);
        if self.grid.cell(to) != Some(Cell::Empty) {
            return;
        }

        self.grid.set(from, Cell::Empty);
        self.grid.set(to, Cell::Agent);
        self.agent.position = to;
        self.stats.tiles_moved = self.stats.tiles_moved.saturating_add(1);
        out_events.push(Event::AgentMoved { from, to });
    }

    fn interact(&mut self, out_events: &mut Vec<Event>) {
        let target = self.agent.position.step(self.agent.facing);
        match self.grid.cell(target) {
            Some(Cell::Resource) => {
                self.grid.set(target, Cell::Empty);
                self.stats.resources_held = self.stats.resources_held.saturating_add(1);
                self.stats.resources_collected = self.stats.resources_collected.saturating_add(1);
                out_events.push(Event::ResourceCollected { cell: target });
                tracing::debug!(
                    x = target.x(),
                    y = target.y(),
                    held = self.stats.resources_held,
                    "resource collected"
                );
                self.spawn_resource(out_events);
            }
            Some(Cell::Obstacle) => {
                if self.stats.resources_held == 0 {
                    return;
                }
                self.grid.set(target, Cell::Empty);
                self.stats.resources_held -= 1;
                self.stats.obstacles_cleared = self.stats.obstacles_cleared.saturating_add(1);
                out_events.push(Event::ObstacleCleared { cell: target });
                tracing::debug!(
                    x = target.x(),
                    y = target.y(),
                    held = self.stats.resources_held,
                    "obstacle cleared"
                );
            }
            _ => {}
        }
    }

    fn spawn_resource(&mut self, out_events: &mut Vec<Event>) {
        let empty_cells = self.grid.positions_of(Cell::Empty);
        if let Some(&cell) = empty_cells.choose(&mut self.resource_rng) {
            self.grid.set(cell, Cell::Resource);
            out_events.push(Event::ResourceSpawned { cell });
            self.place_obstacle(out_events);
        }
        self.refresh_board_state(out_events);
    }

    fn place_obstacle(&mut self, out_events: &mut Vec<Event>) {
        let mut empty_cells = self.grid.positions_of(Cell::Empty);
        let chosen = match self.config.difficulty {
            Difficulty::Normal => empty_cells.choose(&mut self.obstacle_rng).copied(),
            Difficulty::Easy => {
                empty_cells.shuffle(&mut self.obstacle_rng);
                empty_cells
                    .into_iter()
                    .find(|cell| placement::is_safe_obstacle_position(&self.grid, *cell))
            }
        };

        if let Some(cell) = chosen {
            self.grid.set(cell, Cell::Obstacle);
            out_events.push(Event::ObstaclePlaced { cell });
        }
    }

    fn refresh_board_state(&mut self, out_events: &mut Vec<Event>) {
        if self.board_full || self.grid.count(Cell::Empty) > 0 {
            return;
        }

        self.board_full = true;
        out_events.push(Event::BoardFilled);
        tracing::info!(
            collected = self.stats.resources_collected,
            moved = self.stats.tiles_moved,
            "board filled"
        );
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MoveAgent { direction } => {
            if !world.board_full {
                world.move_agent(direction, out_events);
            }
        }
        Command::Interact => {
            if !world.board_full {
                world.interact(out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use cave_in_core::{AgentSnapshot, Grid, Stats, WorldSnapshot};

    /// Captures an owned snapshot suitable for handing to an AI controller.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot {
            grid: world.grid.clone(),
            agent: Some(world.agent),
            stats: world.stats,
            elapsed: world.clock,
            board_full: world.board_full,
        }
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Location and heading of the agent.
    #[must_use]
    pub fn agent(world: &World) -> AgentSnapshot {
        world.agent
    }

    /// Session statistics.
    #[must_use]
    pub fn stats(world: &World) -> Stats {
        world.stats
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether the board filled up and the session ended.
    #[must_use]
    pub fn is_board_full(world: &World) -> bool {
        world.board_full
    }
}

fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_from(layout: &str) -> World {
        let grid = Grid::parse(layout).expect("layout parses");
        World::from_layout(grid, WorldConfig::default()).expect("layout has one agent")
    }

    #[test]
    fn new_world_places_agent_resource_and_obstacle() {
        let world = World::default();
        let grid = query::grid(&world);

        assert_eq!(query::agent(&world).position, Position::new(5, 5));
        assert_eq!(grid.count(Cell::Agent), 1);
        assert_eq!(grid.count(Cell::Resource), 1);
        assert_eq!(grid.count(Cell::Obstacle), 1);
        assert_eq!(grid.count(Cell::Empty), 97);
        assert!(!query::is_board_full(&world));
    }

    #[test]
    fn worlds_with_same_seed_are_identical() {
        let config = WorldConfig {
            seed: 7,
            ..WorldConfig::default()
        };
        let first = World::new(config);
        let second = World::new(config);

        assert_eq!(query::snapshot(&first), query::snapshot(&second));
    }

    #[test]
    fn from_layout_requires_exactly_one_agent() {
        let missing = Grid::parse("..*").expect("layout parses");
        assert_eq!(
            World::from_layout(missing, WorldConfig::default()).err(),
            Some(WorldError::MissingAgent)
        );

        let doubled = Grid::parse("@.@").expect("layout parses");
        assert_eq!(
            World::from_layout(doubled, WorldConfig::default()).err(),
            Some(WorldError::MultipleAgents { count: 2 })
        );
    }

    #[test]
    fn moving_into_obstacle_only_turns_agent() {
        let mut world = world_from(
            "
            @#
            ..
            ",
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Right,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::AgentTurned {
                facing: Direction::Right
            }]
        );
        assert_eq!(query::agent(&world).position, Position::new(0, 0));
        assert_eq!(query::stats(&world).tiles_moved, 0);

        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Down,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::AgentTurned {
                    facing: Direction::Down
                },
                Event::AgentMoved {
                    from: Position::new(0, 0),
                    to: Position::new(0, 1),
                },
            ]
        );
        assert_eq!(query::grid(&world).cell(Position::new(0, 0)), Some(Cell::Empty));
        assert_eq!(query::stats(&world).tiles_moved, 1);
    }

    #[test]
    fn collecting_resource_respawns_resource_and_obstacle() {
        let mut world = world_from(
            "
            @*..
            ....
            ....
            ....
            ",
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::Interact, &mut events);

        assert!(events.contains(&Event::ResourceCollected {
            cell: Position::new(1, 0)
        }));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ResourceSpawned { .. })));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ObstaclePlaced { .. })));

        let grid = query::grid(&world);
        assert_eq!(grid.count(Cell::Resource), 1);
        assert_eq!(grid.count(Cell::Obstacle), 1);
        assert_eq!(query::stats(&world).resources_held, 1);
        assert_eq!(query::stats(&world).resources_collected, 1);
    }

    #[test]
    fn clearing_obstacle_spends_a_held_resource() {
        let mut world = world_from(
            "
            *@#
            ...
            ",
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::Interact, &mut events);
        assert!(query::grid(&world).is_obstacle(Position::new(2, 0)));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ObstacleCleared { .. })));

        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Left,
            },
            &mut events,
        );
        apply(&mut world, Command::Interact, &mut events);
        assert_eq!(query::stats(&world).resources_held, 1);

        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::Interact, &mut events);

        assert!(events.contains(&Event::ObstacleCleared {
            cell: Position::new(2, 0)
        }));
        let stats = query::stats(&world);
        assert_eq!(stats.resources_held, 0);
        assert_eq!(stats.obstacles_cleared, 1);
    }

    #[test]
    fn filling_the_board_ends_the_session() {
        let mut world = world_from("@*.");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::Interact, &mut events);

        assert!(events.contains(&Event::BoardFilled));
        assert!(query::is_board_full(&world));

        events.clear();
        apply(
            &mut world,
            Command::MoveAgent {
                direction: Direction::Left,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(20),
            },
            &mut events,
        );

        assert_eq!(query::elapsed(&world), Duration::from_millis(20));
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(20)
            }]
        );
    }

    #[test]
    fn stream_seeds_differ_by_label() {
        assert_ne!(
            derive_stream_seed(1, RESOURCE_STREAM_LABEL),
            derive_stream_seed(1, OBSTACLE_STREAM_LABEL)
        );
    }
}
