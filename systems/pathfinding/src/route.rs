//! Routes, removal sets and the cost model used to rank them.

use std::collections::BTreeSet;

use cave_in_core::{GridQuery, Position};

/// Ordered sequence of grid-adjacent positions from the agent to a destination.
///
/// A route always holds at least one position: the start. Its length counts
/// positions, so a route between neighbours has length two.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    positions: Vec<Position>,
}

impl Route {
    /// Builds a route, rejecting empty sequences and sequences whose
    /// consecutive positions are not neighbours.
    #[must_use]
    pub fn from_positions(positions: Vec<Position>) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }
        if positions
            .windows(2)
            .any(|pair| !pair[0].is_adjacent(pair[1]))
        {
            return None;
        }
        Some(Self { positions })
    }

    /// First position of the route, where the agent stood when it was planned.
    #[must_use]
    pub fn start(&self) -> Position {
        self.positions[0]
    }

    /// Last position of the route.
    #[must_use]
    pub fn destination(&self) -> Position {
        self.positions[self.positions.len() - 1]
    }

    /// Number of positions, including the start.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`, since [`Route::from_positions`] rejects empty input.
    /// Provided to pair with [`Route::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every position in travel order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Positions still to visit after the start.
    pub fn waypoints(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().skip(1).copied()
    }

    /// Reports whether the route passes through the position.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }

    /// Number of route positions currently holding obstacles.
    pub fn obstacle_count<G>(&self, grid: &G) -> usize
    where
        G: GridQuery + ?Sized,
    {
        self.positions
            .iter()
            .filter(|position| grid.is_obstacle(**position))
            .count()
    }
}

/// Canonical set of obstacles a candidate route plans to clear.
///
/// Backed by an ordered set so equal removal histories compare and hash
/// identically regardless of discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RemovalSet(BTreeSet<Position>);

impl RemovalSet {
    /// Returns a copy of the set extended with `position`.
    #[must_use]
    pub fn with(&self, position: Position) -> Self {
        let mut extended = self.0.clone();
        let _ = extended.insert(position);
        Self(extended)
    }

    /// Number of planned removals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether no removal is planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reports whether the position is planned for removal.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.0.contains(&position)
    }

    /// Planned removals in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.0.iter().copied()
    }
}

/// Scalar route price: `obstacle_value * obstacles + length`. Lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostModel {
    obstacle_value: u32,
}

impl CostModel {
    /// Creates a cost model charging `obstacle_value` per cleared obstacle.
    #[must_use]
    pub const fn new(obstacle_value: u32) -> Self {
        Self { obstacle_value }
    }

    /// Price of a single obstacle removal.
    #[must_use]
    pub const fn obstacle_value(&self) -> u32 {
        self.obstacle_value
    }

    /// Prices a route that clears `obstacles` obstacles.
    #[must_use]
    pub fn cost(&self, route: &Route, obstacles: usize) -> u64 {
        let obstacles = u64::try_from(obstacles).unwrap_or(u64::MAX);
        let length = u64::try_from(route.len()).unwrap_or(u64::MAX);
        u64::from(self.obstacle_value)
            .saturating_mul(obstacles)
            .saturating_add(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_in_core::Grid;

    fn line(points: &[(i32, i32)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn routes_must_be_contiguous_and_non_empty() {
        assert!(Route::from_positions(Vec::new()).is_none());
        assert!(Route::from_positions(line(&[(0, 0), (2, 0)])).is_none());
        assert!(Route::from_positions(line(&[(0, 0), (1, 1)])).is_none());

        let route = Route::from_positions(line(&[(0, 0), (1, 0), (1, 1)])).expect("contiguous");
        assert_eq!(route.len(), 3);
        assert!(!route.is_empty());
        assert_eq!(route.start(), Position::new(0, 0));
        assert_eq!(route.destination(), Position::new(1, 1));
        assert_eq!(
            route.waypoints().collect::<Vec<_>>(),
            line(&[(1, 0), (1, 1)])
        );
    }

    #[test]
    fn obstacle_count_reads_current_grid() {
        let grid = Grid::parse("@#.#").expect("layout parses");
        let route = Route::from_positions(line(&[(0, 0), (1, 0), (2, 0), (3, 0)])).expect("route");
        assert_eq!(route.obstacle_count(&grid), 2);
        assert!(route.contains(Position::new(3, 0)));
    }

    #[test]
    fn removal_sets_are_canonical() {
        let first = RemovalSet::default()
            .with(Position::new(3, 1))
            .with(Position::new(1, 2));
        let second = RemovalSet::default()
            .with(Position::new(1, 2))
            .with(Position::new(3, 1));

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            vec![Position::new(1, 2), Position::new(3, 1)]
        );
    }

    #[test]
    fn cost_weighs_obstacles_against_length() {
        let route = Route::from_positions(line(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]))
            .expect("route");
        assert_eq!(CostModel::new(10).cost(&route, 1), 15);
        assert_eq!(CostModel::new(5).cost(&route, 0), 5);
    }
}
