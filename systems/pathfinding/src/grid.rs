//! Grid helpers layered on top of [`GridQuery`].

use std::collections::BTreeSet;

use cave_in_core::{Cell, CellKind, Direction, GridQuery, Position};

/// Enumerates the in-bounds cardinal neighbours of `position` in the fixed
/// order up, right, down, left. Out-of-bounds input yields nothing.
pub fn neighbors<G>(grid: &G, position: Position) -> NeighborIter
where
    G: GridQuery + ?Sized,
{
    let mut neighbors = NeighborIter::default();
    if !grid.contains(position) {
        return neighbors;
    }

    for direction in Direction::ALL {
        let candidate = position.step(direction);
        if grid.contains(candidate) {
            neighbors.push(candidate);
        }
    }

    neighbors
}

/// Reports whether the agent could stand on the position once it is reached.
pub fn is_walkable<G>(grid: &G, position: Position) -> bool
where
    G: GridQuery + ?Sized,
{
    matches!(
        grid.classify(position),
        CellKind::Empty | CellKind::Resource
    )
}

/// Iterator over at most four neighbouring positions.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<Position>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, position: Position) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(position);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Resource and obstacle layout observed at one point in time.
///
/// Two signatures differ exactly when a resource or obstacle appeared or
/// disappeared, which is what invalidates a committed route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutSignature {
    resources: BTreeSet<Position>,
    obstacles: BTreeSet<Position>,
}

impl LayoutSignature {
    /// Captures the current resource and obstacle positions.
    pub fn capture<G>(grid: &G) -> Self
    where
        G: GridQuery + ?Sized,
    {
        Self {
            resources: grid.positions_of(Cell::Resource).into_iter().collect(),
            obstacles: grid.positions_of(Cell::Obstacle).into_iter().collect(),
        }
    }

    /// Number of resources in the captured layout.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Number of obstacles in the captured layout.
    #[must_use]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_in_core::Grid;

    #[test]
    fn neighbors_follow_fixed_order() {
        let grid = Grid::square(3);
        let around: Vec<_> = neighbors(&grid, Position::new(1, 1)).collect();
        assert_eq!(
            around,
            vec![
                Position::new(1, 0),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(0, 1),
            ]
        );
    }

    #[test]
    fn neighbors_clip_at_edges_and_ignore_invalid_input() {
        let grid = Grid::square(3);
        let corner: Vec<_> = neighbors(&grid, Position::new(0, 0)).collect();
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(neighbors(&grid, Position::new(-1, 7)).count(), 0);
    }

    #[test]
    fn walkable_cells_exclude_obstacles_agent_and_bounds() {
        let grid = Grid::parse("@.#*").expect("layout parses");
        assert!(!is_walkable(&grid, Position::new(0, 0)));
        assert!(is_walkable(&grid, Position::new(1, 0)));
        assert!(!is_walkable(&grid, Position::new(2, 0)));
        assert!(is_walkable(&grid, Position::new(3, 0)));
        assert!(!is_walkable(&grid, Position::new(4, 0)));
    }

    #[test]
    fn signature_tracks_resource_and_obstacle_sets() {
        let before = Grid::parse("@.#*").expect("layout parses");
        let moved = Grid::parse(".@#*").expect("layout parses");
        let cleared = Grid::parse("@..*").expect("layout parses");

        let signature = LayoutSignature::capture(&before);
        assert_eq!(signature.resource_count(), 1);
        assert_eq!(signature.obstacle_count(), 1);
        assert_eq!(signature, LayoutSignature::capture(&moved));
        assert_ne!(signature, LayoutSignature::capture(&cleared));
    }
}
