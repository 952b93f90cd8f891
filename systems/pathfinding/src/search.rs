//! Breadth-first route search with and without obstacle removal budgets.

use std::collections::{HashSet, VecDeque};

use cave_in_core::{CellKind, GridQuery, Position};

use crate::{
    grid::neighbors,
    route::{RemovalSet, Route},
};

/// Route returned by a budgeted search together with the obstacles it clears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetedRoute {
    /// Positions from start to goal.
    pub route: Route,
    /// Obstacles on the route that must be cleared to walk it.
    pub removals: RemovalSet,
}

/// Breadth-first searches over a read-only grid.
///
/// Neighbours are always expanded up, right, down, left, so equal-length
/// routes are broken the same way for identical inputs.
#[derive(Debug)]
pub struct PathSearch<'g, G: ?Sized> {
    grid: &'g G,
    state_limit: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    position: Position,
    parent: Option<usize>,
}

impl<'g, G> PathSearch<'g, G>
where
    G: GridQuery + ?Sized,
{
    /// Creates a search over the provided grid.
    pub fn new(grid: &'g G) -> Self {
        Self {
            grid,
            state_limit: None,
        }
    }

    /// Caps the `(position, removal set)` states a budgeted search may visit.
    /// A search that runs past the cap gives up and reports no route.
    #[must_use]
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = Some(limit);
        self
    }

    /// Shortest route that never enters an obstacle.
    #[must_use]
    pub fn shortest_path_avoiding_obstacles(
        &self,
        start: Position,
        goal: Position,
    ) -> Option<Route> {
        self.plain_search(start, goal, false)
    }

    /// Shortest route when every obstacle is treated as passable. This is the
    /// unrestricted baseline the optimizer compares against.
    #[must_use]
    pub fn shortest_path_ignoring_obstacles(
        &self,
        start: Position,
        goal: Position,
    ) -> Option<Route> {
        self.plain_search(start, goal, true)
    }

    /// Shortest route that clears at most `max_removals` obstacles.
    ///
    /// States are `(position, removal set)` pairs, each visited once. The
    /// first state to reach the goal wins, which yields a shortest route for
    /// some removal count within the budget but not necessarily the smallest
    /// such count. Returns `None` once the state limit is exceeded.
    #[must_use]
    pub fn shortest_path_with_budget(
        &self,
        start: Position,
        goal: Position,
        max_removals: usize,
    ) -> Option<BudgetedRoute> {
        if !self.grid.contains(start) {
            return None;
        }
        if start == goal {
            return Some(BudgetedRoute {
                route: Route::from_positions(vec![start])?,
                removals: RemovalSet::default(),
            });
        }
        if !self.enterable(goal, max_removals > 0) {
            return None;
        }

        let mut nodes = vec![Node {
            position: start,
            parent: None,
        }];
        let mut visited: HashSet<(Position, RemovalSet)> = HashSet::new();
        let _ = visited.insert((start, RemovalSet::default()));
        let mut queue = VecDeque::new();
        queue.push_back((0_usize, RemovalSet::default()));

        while let Some((index, removals)) = queue.pop_front() {
            let position = nodes[index].position;
            for neighbor in neighbors(self.grid, position) {
                let passable_obstacle = removals.len() < max_removals;
                if !self.enterable(neighbor, passable_obstacle) {
                    continue;
                }

                let child_removals = if self.grid.is_obstacle(neighbor) {
                    removals.with(neighbor)
                } else {
                    removals.clone()
                };
                if !visited.insert((neighbor, child_removals.clone())) {
                    continue;
                }
                if self.state_limit.is_some_and(|limit| visited.len() > limit) {
                    tracing::debug!(
                        explored = visited.len(),
                        max_removals,
                        "budgeted search hit its state limit"
                    );
                    return None;
                }

                nodes.push(Node {
                    position: neighbor,
                    parent: Some(index),
                });
                let child = nodes.len() - 1;
                if neighbor == goal {
                    tracing::trace!(
                        explored = visited.len(),
                        removals = child_removals.len(),
                        "budgeted search reached goal"
                    );
                    return Some(BudgetedRoute {
                        route: unwind(&nodes, child)?,
                        removals: child_removals,
                    });
                }
                queue.push_back((child, child_removals));
            }
        }

        tracing::trace!(explored = visited.len(), max_removals, "budgeted search exhausted");
        None
    }

    fn plain_search(
        &self,
        start: Position,
        goal: Position,
        through_obstacles: bool,
    ) -> Option<Route> {
        if !self.grid.contains(start) {
            return None;
        }
        if start == goal {
            return Route::from_positions(vec![start]);
        }
        if !self.enterable(goal, through_obstacles) {
            return None;
        }

        let mut nodes = vec![Node {
            position: start,
            parent: None,
        }];
        let mut visited: HashSet<Position> = HashSet::new();
        let _ = visited.insert(start);
        let mut queue = VecDeque::new();
        queue.push_back(0_usize);

        while let Some(index) = queue.pop_front() {
            let position = nodes[index].position;
            for neighbor in neighbors(self.grid, position) {
                if !self.enterable(neighbor, through_obstacles) || !visited.insert(neighbor) {
                    continue;
                }

                nodes.push(Node {
                    position: neighbor,
                    parent: Some(index),
                });
                let child = nodes.len() - 1;
                if neighbor == goal {
                    return unwind(&nodes, child);
                }
                queue.push_back(child);
            }
        }

        None
    }

    fn enterable(&self, position: Position, through_obstacles: bool) -> bool {
        match self.grid.classify(position) {
            CellKind::Empty | CellKind::Resource => true,
            CellKind::Obstacle => through_obstacles,
            CellKind::Agent | CellKind::OutOfBounds => false,
        }
    }
}

fn unwind(nodes: &[Node], mut index: usize) -> Option<Route> {
    let mut positions = Vec::new();
    loop {
        let node = nodes.get(index)?;
        positions.push(node.position);
        match node.parent {
            Some(parent) => index = parent,
            None => break,
        }
    }
    positions.reverse();
    Route::from_positions(positions)
}
