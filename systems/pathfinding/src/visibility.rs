//! View-limited target acquisition.

use cave_in_core::{GridQuery, Movement, Position};

use crate::{grid::is_walkable, scorer::PositionScorer, vector};

/// Picks positions within the agent's visibility radius.
///
/// When the true target lies beyond the radius the scanner walks the bearing
/// toward it and fans out perpendicular to that bearing. The fan widens with
/// distance and closes again at the rim, so the work done depends only on the
/// radius and never on the grid size.
#[derive(Debug)]
pub struct VisibilityScanner<'g, G: ?Sized> {
    grid: &'g G,
    radius: u32,
}

impl<'g, G> VisibilityScanner<'g, G>
where
    G: GridQuery + ?Sized,
{
    /// Creates a scanner seeing `radius` cells in Manhattan distance.
    pub fn new(grid: &'g G, radius: u32) -> Self {
        Self { grid, radius }
    }

    /// Returns the target itself when it is visible and standable, otherwise
    /// the best-scoring proxy in range. `None` when nothing in range is usable.
    #[must_use]
    pub fn pick_visible_target(
        &self,
        agent: Position,
        target: Position,
        momentum: Option<Movement>,
    ) -> Option<Position> {
        if agent.manhattan_distance(target) <= self.radius && is_walkable(self.grid, target) {
            return Some(target);
        }

        let bearing = vector::bearing(agent, target);
        if bearing == glam::Vec2::ZERO {
            return None;
        }
        let across = bearing.perp();
        let origin = glam::Vec2::new(agent.x() as f32, agent.y() as f32);
        let scorer = PositionScorer::new(self.grid);
        let radius = i64::from(self.radius);

        let mut best: Option<(Position, f32)> = None;
        for distance in 0..=radius {
            let spread = (distance / 2).min(radius - distance);
            let along = origin + bearing * distance as f32;
            for offset in -spread..=spread {
                let point = along + across * offset as f32;
                let candidate = Position::new(point.x as i32, point.y as i32);
                if !self.in_range(agent, candidate) {
                    continue;
                }

                let score = scorer.score(candidate, target, momentum);
                if best.map_or(true, |(_, lowest)| score < lowest) {
                    best = Some((candidate, score));
                }
            }
        }

        best.map(|(position, _)| position)
    }

    fn in_range(&self, agent: Position, candidate: Position) -> bool {
        candidate != agent
            && agent.manhattan_distance(candidate) <= self.radius
            && is_walkable(self.grid, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_in_core::Grid;

    #[test]
    fn visible_target_is_returned_directly() {
        let grid = Grid::square(10);
        let scanner = VisibilityScanner::new(&grid, 4);
        let target = Position::new(2, 2);
        assert_eq!(
            scanner.pick_visible_target(Position::new(0, 0), target, None),
            Some(target)
        );
    }

    #[test]
    fn distant_target_yields_proxy_along_bearing() {
        let grid = Grid::square(10);
        let scanner = VisibilityScanner::new(&grid, 4);
        let agent = Position::new(0, 0);
        let target = Position::new(9, 0);

        let proxy = scanner
            .pick_visible_target(agent, target, None)
            .expect("open grid has a proxy");
        assert_eq!(proxy, Position::new(4, 0));
        assert!(agent.manhattan_distance(proxy) <= 4);
        assert!(proxy.manhattan_distance(target) < agent.manhattan_distance(target));
    }

    #[test]
    fn obstacle_targets_within_range_fall_back_to_proxies() {
        let grid = Grid::parse(
            "
            @..#
            ....
            ",
        )
        .expect("layout parses");
        let scanner = VisibilityScanner::new(&grid, 4);

        let proxy = scanner.pick_visible_target(Position::new(0, 0), Position::new(3, 0), None);
        assert_eq!(proxy, Some(Position::new(2, 0)));
    }

    #[test]
    fn enclosed_agent_has_no_proxy() {
        let grid = Grid::parse(
            "
            .#...
            #@#..
            .#...
            .....
            ....*
            ",
        )
        .expect("layout parses");
        let scanner = VisibilityScanner::new(&grid, 1);

        assert_eq!(
            scanner.pick_visible_target(Position::new(1, 1), Position::new(4, 4), None),
            None
        );
    }
}
