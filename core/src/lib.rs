#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cave In engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pathfinding system. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values.
//! The agent never mutates the grid itself: it reads [`WorldSnapshot`] values
//! through the [`GridQuery`] surface and acts exclusively through an
//! [`ActionInterface`].

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as signed column and row coordinates.
///
/// Coordinates are signed so neighbour arithmetic at the grid edge produces a
/// representable position that simply classifies as [`CellKind::OutOfBounds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the position translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Returns the adjacent position one step away in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Reports whether the two positions share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Cardinal directions available to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in the fixed enumeration order used by searches.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Resolves the direction described by a movement vector, if any.
    #[must_use]
    pub fn from_movement(movement: Movement) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.delta() == (movement.dx(), movement.dy()))
    }
}

/// Movement vector produced by the AI contract.
///
/// Each component lies in `{-1, 0, 1}` and at most one component is non-zero.
/// The only constructors are [`Movement::NONE`] and [`Movement::from_direction`],
/// which keeps that invariant by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movement {
    dx: i32,
    dy: i32,
}

impl Movement {
    /// The neutral "stay put" movement.
    pub const NONE: Self = Self { dx: 0, dy: 0 };

    /// Creates the unit movement for a cardinal direction.
    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { dx, dy }
    }

    /// Horizontal component of the movement.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical component of the movement.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the movement leaves the agent in place.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Contents of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Open floor the agent may walk across.
    Empty,
    /// Rock that blocks movement until cleared with a collected resource.
    Obstacle,
    /// Collectible stick.
    Resource,
    /// Cell occupied by the agent itself.
    Agent,
}

impl Cell {
    /// Glyph used by text layouts for this cell.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Obstacle => '#',
            Self::Resource => '*',
            Self::Agent => '@',
        }
    }

    /// Parses a text layout glyph.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Empty),
            '#' => Some(Self::Obstacle),
            '*' => Some(Self::Resource),
            '@' => Some(Self::Agent),
            _ => None,
        }
    }
}

/// Classification returned when querying an arbitrary position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// In-bounds open floor.
    Empty,
    /// In-bounds obstacle.
    Obstacle,
    /// In-bounds resource.
    Resource,
    /// In-bounds cell occupied by the agent.
    Agent,
    /// Position outside the grid.
    OutOfBounds,
}

impl From<Cell> for CellKind {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => Self::Empty,
            Cell::Obstacle => Self::Obstacle,
            Cell::Resource => Self::Resource,
            Cell::Agent => Self::Agent,
        }
    }
}

/// Read-only queries over a rectangular grid.
///
/// Implementors only provide the dimensions and raw cell lookup. Every
/// provided method tolerates arbitrary positions and reports
/// [`CellKind::OutOfBounds`] instead of failing.
pub trait GridQuery {
    /// Number of columns and rows contained in the grid.
    fn dimensions(&self) -> (u32, u32);

    /// Returns the cell stored at the position, or `None` when out of bounds.
    fn cell(&self, position: Position) -> Option<Cell>;

    /// Reports whether the position lies within the grid.
    fn contains(&self, position: Position) -> bool {
        let (columns, rows) = self.dimensions();
        let column = u32::try_from(position.x()).ok();
        let row = u32::try_from(position.y()).ok();
        matches!((column, row), (Some(column), Some(row)) if column < columns && row < rows)
    }

    /// Classifies the position.
    fn classify(&self, position: Position) -> CellKind {
        self.cell(position)
            .map_or(CellKind::OutOfBounds, CellKind::from)
    }

    /// Reports whether the position holds an obstacle.
    fn is_obstacle(&self, position: Position) -> bool {
        self.classify(position) == CellKind::Obstacle
    }

    /// Reports whether the position holds a resource.
    fn is_resource(&self, position: Position) -> bool {
        self.classify(position) == CellKind::Resource
    }

    /// Enumerates every position holding the provided cell in row-major order.
    fn positions_of(&self, cell: Cell) -> Vec<Position> {
        let (columns, rows) = self.dimensions();
        let mut found = Vec::new();
        for row in 0..rows {
            let Ok(y) = i32::try_from(row) else {
                break;
            };
            for column in 0..columns {
                let Ok(x) = i32::try_from(column) else {
                    break;
                };
                let position = Position::new(x, y);
                if self.cell(position) == Some(cell) {
                    found.push(position);
                }
            }
        }
        found
    }
}

/// Dense row-major grid storing exactly one cell per in-bounds position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of the provided dimensions filled with empty cells.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; capacity],
        }
    }

    /// Creates a square grid with `size` cells along each edge.
    #[must_use]
    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Parses a text layout where `.` is empty, `#` an obstacle, `*` a
    /// resource and `@` the agent. Blank lines and surrounding whitespace are
    /// ignored.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };

        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width.saturating_mul(lines.len()));
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            for (column, glyph) in line.chars().enumerate() {
                let cell = Cell::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                cells.push(cell);
            }
        }

        let columns = i32::try_from(width)
            .ok()
            .and_then(|_| u32::try_from(width).ok())
            .ok_or(LayoutError::TooLarge)?;
        let rows = i32::try_from(lines.len())
            .ok()
            .and_then(|_| u32::try_from(lines.len()).ok())
            .ok_or(LayoutError::TooLarge)?;

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Replaces the cell stored at the position. Out-of-bounds writes are ignored.
    pub fn set(&mut self, position: Position, cell: Cell) {
        if let Some(index) = self.index(position) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = cell;
            }
        }
    }

    /// Number of cells currently holding the provided contents.
    #[must_use]
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|stored| **stored == cell).count()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let row = usize::try_from(position.y()).ok()?;
        let column = usize::try_from(position.x()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

impl GridQuery for Grid {
    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn cell(&self, position: Position) -> Option<Cell> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.columns).unwrap_or(0);
        if width == 0 {
            return Ok(());
        }

        for (row, chunk) in self.cells.chunks(width).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in chunk {
                write!(f, "{}", cell.glyph())?;
            }
        }
        Ok(())
    }
}

/// Errors raised while parsing a text layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contained no rows.
    #[error("layout is empty")]
    Empty,
    /// A row's width differed from the first row.
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph did not describe any known cell.
    #[error("unknown layout glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
    },
    /// The layout exceeded the addressable coordinate range.
    #[error("layout dimensions exceed the supported coordinate range")]
    TooLarge,
}

/// Location and heading of the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Cell currently occupied by the agent.
    pub position: Position,
    /// Direction the agent currently faces.
    pub facing: Direction,
}

/// Running session statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Collected resources that have not yet been spent clearing obstacles.
    pub resources_held: u32,
    /// Total resources collected during the session.
    pub resources_collected: u32,
    /// Total obstacles cleared during the session.
    pub obstacles_cleared: u32,
    /// Total successful single-cell moves.
    pub tiles_moved: u32,
}

/// Read-only capture of the world handed to the AI every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    /// Copy of the grid contents.
    pub grid: Grid,
    /// Agent location and heading, if an agent exists.
    pub agent: Option<AgentSnapshot>,
    /// Session statistics, including the obstacle-removal credit balance.
    pub stats: Stats,
    /// Simulated time elapsed since the session started.
    pub elapsed: Duration,
    /// Indicates that no empty cell remains and the session is over.
    pub board_full: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Turns the agent toward the direction and steps into it when the cell is empty.
    MoveAgent {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Interacts with the cell the agent currently faces.
    Interact,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the agent now faces a different direction.
    AgentTurned {
        /// New heading of the agent.
        facing: Direction,
    },
    /// Confirms that the agent moved between two cells.
    AgentMoved {
        /// Cell the agent occupied before moving.
        from: Position,
        /// Cell the agent occupies after moving.
        to: Position,
    },
    /// Confirms that a resource was collected.
    ResourceCollected {
        /// Cell the resource occupied.
        cell: Position,
    },
    /// Confirms that an obstacle was cleared by spending a resource.
    ObstacleCleared {
        /// Cell the obstacle occupied.
        cell: Position,
    },
    /// Announces a freshly spawned resource.
    ResourceSpawned {
        /// Cell that now holds the resource.
        cell: Position,
    },
    /// Announces a freshly placed obstacle.
    ObstaclePlaced {
        /// Cell that now holds the obstacle.
        cell: Position,
    },
    /// Announces that no empty cell remains.
    BoardFilled,
}

/// Operations the agent may perform on the world.
pub trait ActionInterface {
    /// Cell currently occupied by the agent.
    fn current_position(&self) -> Option<Position>;

    /// Direction the agent currently faces.
    fn current_facing(&self) -> Option<Direction>;

    /// Attempts a single step. Fails when the destination is occupied or out
    /// of bounds; the agent turns toward the movement either way.
    fn try_move(&mut self, movement: Movement) -> bool;

    /// Interacts with the faced cell, reporting whether anything happened.
    fn try_interact(&mut self) -> bool;
}

/// Contract between the outer game loop and an autonomous controller.
pub trait AiController {
    /// Computes and executes this tick's movement.
    fn get_movement(&mut self, actions: &mut dyn ActionInterface) -> Movement;

    /// Decides whether to interact this tick, performing the interaction when it does.
    fn should_use_action(&mut self, actions: &mut dyn ActionInterface) -> bool;

    /// Receives the latest world state.
    fn update(&mut self, snapshot: &WorldSnapshot);
}
