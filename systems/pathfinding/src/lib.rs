#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pathfinding and route-scoring engine that drives the Cave In agent.
//!
//! The crate is layered leaves first: [`grid`] and [`vector`] provide pure
//! helpers, [`scorer`] and [`visibility`] choose where to head, [`search`]
//! and [`optimizer`] decide how to get there, [`decider`] gates interactions
//! and [`agent`] composes everything behind the [`cave_in_core::AiController`]
//! contract. Nothing here mutates the grid; every effect goes through an
//! [`cave_in_core::ActionInterface`].

pub mod agent;
pub mod config;
pub mod decider;
pub mod grid;
pub mod optimizer;
pub mod route;
pub mod scorer;
pub mod search;
pub mod vector;
pub mod visibility;

pub use agent::{Agent, AgentState, AgentView};
pub use config::{BudgetSearch, PathfindingConfig, TiePreference};
pub use decider::ActionDecider;
pub use optimizer::{PlannedRoute, RouteOptimizer};
pub use route::{CostModel, RemovalSet, Route};
pub use scorer::PositionScorer;
pub use search::{BudgetedRoute, PathSearch};
pub use visibility::VisibilityScanner;
