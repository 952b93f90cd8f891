//! Chooses between obstacle-free and obstacle-clearing routes.

use std::cmp::Ordering;

use cave_in_core::{GridQuery, Position};

use crate::{
    config::{BudgetSearch, PathfindingConfig, TiePreference},
    route::{CostModel, Route},
    search::PathSearch,
};

/// Route selected by the optimizer, priced by the cost model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRoute {
    /// Positions from the agent to the target.
    pub route: Route,
    /// Obstacles the route clears on the way.
    pub obstacles: usize,
    /// `obstacle_value * obstacles + route length`.
    pub cost: u64,
}

/// Computes the cheapest route to a target under the configured cost model.
#[derive(Clone, Copy, Debug)]
pub struct RouteOptimizer {
    cost_model: CostModel,
    max_removals: Option<usize>,
    budget_search: BudgetSearch,
    tie_preference: TiePreference,
    max_search_states: usize,
}

impl RouteOptimizer {
    /// Creates an optimizer from the shared configuration.
    #[must_use]
    pub fn new(config: &PathfindingConfig) -> Self {
        Self {
            cost_model: CostModel::new(config.obstacle_value),
            max_removals: config.max_removals,
            budget_search: config.budget_search,
            tie_preference: config.tie_preference,
            max_search_states: config.max_search_states,
        }
    }

    /// Cost model used to price candidates.
    #[must_use]
    pub fn cost_model(&self) -> CostModel {
        self.cost_model
    }

    /// Plans a route from `start` to `target`, clearing at most `credits`
    /// obstacles.
    ///
    /// The obstacle-free route is always a candidate. When the unrestricted
    /// baseline has to cross obstacles, removal budgets up to the smaller of
    /// its obstacle count, the credits and the configured cap are probed and
    /// every feasible route is priced. The cheapest candidate wins.
    pub fn plan<G>(
        &self,
        grid: &G,
        start: Position,
        target: Position,
        credits: u32,
    ) -> Option<PlannedRoute>
    where
        G: GridQuery + ?Sized,
    {
        let search = PathSearch::new(grid).with_state_limit(self.max_search_states);
        let avoiding = search
            .shortest_path_avoiding_obstacles(start, target)
            .map(|route| self.price(route, 0));

        let baseline = search.shortest_path_ignoring_obstacles(start, target)?;
        let crossings = baseline.obstacle_count(grid);
        if crossings == 0 {
            return avoiding.or_else(|| Some(self.price(baseline, 0)));
        }

        let credits = usize::try_from(credits).unwrap_or(usize::MAX);
        let ceiling = crossings
            .min(credits)
            .min(self.max_removals.unwrap_or(usize::MAX));

        let mut best = avoiding;
        if crossings <= ceiling {
            self.consider(&mut best, self.price(baseline, crossings));
        }

        match self.budget_search {
            BudgetSearch::Binary => {
                let mut low = 0_usize;
                let mut high = ceiling;
                while low <= high {
                    let budget = low + (high - low) / 2;
                    match search.shortest_path_with_budget(start, target, budget) {
                        Some(found) => {
                            let obstacles = found.removals.len();
                            self.consider(&mut best, self.price(found.route, obstacles));
                            if budget == 0 {
                                break;
                            }
                            high = budget - 1;
                        }
                        None => low = budget + 1,
                    }
                }
            }
            BudgetSearch::Exhaustive => {
                for budget in 0..=ceiling {
                    if let Some(found) = search.shortest_path_with_budget(start, target, budget) {
                        let obstacles = found.removals.len();
                        self.consider(&mut best, self.price(found.route, obstacles));
                    }
                }
            }
        }

        if let Some(planned) = &best {
            tracing::debug!(
                x = target.x(),
                y = target.y(),
                length = planned.route.len(),
                obstacles = planned.obstacles,
                cost = planned.cost,
                ceiling,
                "route planned"
            );
        }
        best
    }

    fn price(&self, route: Route, obstacles: usize) -> PlannedRoute {
        let cost = self.cost_model.cost(&route, obstacles);
        PlannedRoute {
            route,
            obstacles,
            cost,
        }
    }

    fn consider(&self, best: &mut Option<PlannedRoute>, candidate: PlannedRoute) {
        let better = match best {
            None => true,
            Some(current) => self.compare(&candidate, current) == Ordering::Less,
        };
        if better {
            *best = Some(candidate);
        }
    }

    fn compare(&self, candidate: &PlannedRoute, current: &PlannedRoute) -> Ordering {
        let by_obstacles = candidate.obstacles.cmp(&current.obstacles);
        let by_length = candidate.route.len().cmp(&current.route.len());
        let tie_break = match self.tie_preference {
            TiePreference::FewerRemovals => by_obstacles.then(by_length),
            TiePreference::ShorterRoute => by_length.then(by_obstacles),
        };
        candidate.cost.cmp(&current.cost).then(tie_break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_in_core::Grid;

    fn wall_grid() -> Grid {
        Grid::parse(
            "
            @.#.*
            ..#..
            ..#..
            ..#..
            .....
            ",
        )
        .expect("layout parses")
    }

    fn optimizer(obstacle_value: u32) -> RouteOptimizer {
        RouteOptimizer::new(&PathfindingConfig {
            obstacle_value,
            ..PathfindingConfig::default()
        })
    }

    #[test]
    fn open_grid_returns_obstacle_free_route() {
        let grid = Grid::square(5);
        let planned = optimizer(10)
            .plan(&grid, Position::new(0, 0), Position::new(4, 4), 0)
            .expect("open grid");

        assert_eq!(planned.route.len(), 9);
        assert_eq!(planned.obstacles, 0);
        assert_eq!(planned.cost, 9);
    }

    #[test]
    fn expensive_obstacles_keep_the_detour() {
        let planned = optimizer(10)
            .plan(&wall_grid(), Position::new(0, 0), Position::new(4, 0), 3)
            .expect("route exists");

        assert_eq!(planned.route.len(), 13);
        assert_eq!(planned.obstacles, 0);
        assert_eq!(planned.cost, 13);
    }

    #[test]
    fn cheap_obstacles_cut_through_the_wall() {
        let planned = optimizer(5)
            .plan(&wall_grid(), Position::new(0, 0), Position::new(4, 0), 3)
            .expect("route exists");

        assert_eq!(planned.route.len(), 5);
        assert_eq!(planned.obstacles, 1);
        assert_eq!(planned.cost, 10);
    }

    #[test]
    fn without_credits_only_the_detour_is_possible() {
        let planned = optimizer(1)
            .plan(&wall_grid(), Position::new(0, 0), Position::new(4, 0), 0)
            .expect("route exists");
        assert_eq!(planned.obstacles, 0);
        assert_eq!(planned.route.len(), 13);
    }

    #[test]
    fn equal_costs_follow_tie_preference() {
        let grid = wall_grid();
        let start = Position::new(0, 0);
        let target = Position::new(4, 0);
        let base = PathfindingConfig {
            obstacle_value: 8,
            ..PathfindingConfig::default()
        };

        let fewer = RouteOptimizer::new(&base)
            .plan(&grid, start, target, 1)
            .expect("route exists");
        assert_eq!((fewer.cost, fewer.obstacles), (13, 0));

        let shorter = RouteOptimizer::new(&PathfindingConfig {
            tie_preference: TiePreference::ShorterRoute,
            ..base
        })
        .plan(&grid, start, target, 1)
        .expect("route exists");
        assert_eq!((shorter.cost, shorter.obstacles), (13, 1));
        assert_eq!(shorter.route.len(), 5);
    }

    #[test]
    fn enclosed_start_without_credit_has_no_route() {
        let grid = Grid::parse(
            "
            .#...
            #@#..
            .#...
            ....*
            ",
        )
        .expect("layout parses");

        assert!(optimizer(10)
            .plan(&grid, Position::new(1, 1), Position::new(4, 3), 0)
            .is_none());
        assert!(optimizer(10)
            .plan(&grid, Position::new(1, 1), Position::new(4, 3), 1)
            .is_some());
    }

    #[test]
    fn planning_is_idempotent() {
        let grid = wall_grid();
        let optimizer = optimizer(5);
        let first = optimizer.plan(&grid, Position::new(0, 0), Position::new(4, 0), 2);
        let second = optimizer.plan(&grid, Position::new(0, 0), Position::new(4, 0), 2);
        assert_eq!(first, second);
    }
}
