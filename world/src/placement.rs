//! Obstacle placement rules that keep the board playable.

use std::collections::HashSet;

use cave_in_core::{Cell, Direction, Grid, GridQuery, Position};

/// Candidates already walled in on this many of their eight neighbours are
/// accepted without a connectivity check.
const QUICK_ACCEPT_NEIGHBORS: usize = 7;

/// Reports whether turning `candidate` into an obstacle keeps the board fair.
///
/// The walkable cells (everything except obstacles and the candidate) are
/// partitioned into connected regions. A placement that leaves one region is
/// always safe; a placement that splits the board is rejected when any region
/// still holds both a resource and an empty cell.
pub(crate) fn is_safe_obstacle_position(grid: &Grid, candidate: Position) -> bool {
    if surrounding_obstacles(grid, candidate) >= QUICK_ACCEPT_NEIGHBORS {
        return true;
    }

    let regions = walkable_regions(grid, candidate);
    if regions.len() <= 1 {
        return true;
    }

    !regions.iter().any(|region| {
        let has_resource = region.iter().any(|cell| grid.is_resource(*cell));
        let has_empty = region
            .iter()
            .any(|cell| grid.cell(*cell) == Some(Cell::Empty));
        has_resource && has_empty
    })
}

fn surrounding_obstacles(grid: &Grid, center: Position) -> usize {
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if grid.is_obstacle(center.offset(dx, dy)) {
                count += 1;
            }
        }
    }
    count
}

/// Flood-fills the walkable cells with an explicit stack so large grids never
/// exhaust the call stack.
fn walkable_regions(grid: &Grid, blocked: Position) -> Vec<Vec<Position>> {
    let is_walkable = |cell: Position| {
        cell != blocked
            && matches!(
                grid.cell(cell),
                Some(Cell::Empty | Cell::Resource | Cell::Agent)
            )
    };

    let (columns, rows) = grid.dimensions();
    let mut seen: HashSet<Position> = HashSet::new();
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for row in 0..rows {
        for column in 0..columns {
            let (Ok(x), Ok(y)) = (i32::try_from(column), i32::try_from(row)) else {
                continue;
            };
            let seed = Position::new(x, y);
            if !is_walkable(seed) || !seen.insert(seed) {
                continue;
            }

            let mut region = Vec::new();
            stack.push(seed);
            while let Some(cell) = stack.pop() {
                region.push(cell);
                for direction in Direction::ALL {
                    let neighbor = cell.step(direction);
                    if is_walkable(neighbor) && seen.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
            regions.push(region);
        }
    }

    regions
}
