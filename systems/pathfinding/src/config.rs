//! Tunable parameters of the pathfinding engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_OBSTACLE_VALUE: u32 = 10;
const DEFAULT_VISIBILITY_RADIUS: u32 = 4;
const DEFAULT_MAX_REMOVALS: usize = 6;
const DEFAULT_ACTION_COOLDOWN_MS: u64 = 20;
const DEFAULT_MAX_SEARCH_STATES: usize = 20_000;

/// Strategy used to probe obstacle-removal budgets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSearch {
    /// Halves the budget range after every probe, moving lower while routes
    /// stay feasible. Fast, but may miss the cheapest budget.
    #[default]
    Binary,
    /// Probes every budget from zero to the ceiling.
    Exhaustive,
}

/// Ordering applied when two candidate routes have the same cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePreference {
    /// Prefer the route that clears fewer obstacles.
    #[default]
    FewerRemovals,
    /// Prefer the route with fewer positions.
    ShorterRoute,
}

/// Configuration shared by every pathfinding component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    /// Price of clearing one obstacle, expressed in route positions.
    pub obstacle_value: u32,
    /// Manhattan radius the agent can see. `None` grants full-map vision.
    pub visibility_radius: Option<u32>,
    /// Hard cap on obstacles a single search may plan to clear. `None` removes
    /// the cap, which can be very slow on crowded grids.
    pub max_removals: Option<usize>,
    /// How removal budgets are probed.
    pub budget_search: BudgetSearch,
    /// How equal-cost routes are ordered.
    pub tie_preference: TiePreference,
    /// Minimum interval between two interactions, in milliseconds.
    pub action_cooldown_ms: u64,
    /// States a single budgeted search may visit before it gives up. Keeps
    /// planning on large crowded grids within one tick.
    pub max_search_states: usize,
}

impl PathfindingConfig {
    /// Minimum interval between two interactions.
    #[must_use]
    pub fn action_cooldown(&self) -> Duration {
        Duration::from_millis(self.action_cooldown_ms)
    }
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            obstacle_value: DEFAULT_OBSTACLE_VALUE,
            visibility_radius: Some(DEFAULT_VISIBILITY_RADIUS),
            max_removals: Some(DEFAULT_MAX_REMOVALS),
            budget_search: BudgetSearch::default(),
            tie_preference: TiePreference::default(),
            action_cooldown_ms: DEFAULT_ACTION_COOLDOWN_MS,
            max_search_states: DEFAULT_MAX_SEARCH_STATES,
        }
    }
}
