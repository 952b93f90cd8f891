//! Interaction gating.

use std::time::Duration;

use cave_in_core::{CellKind, GridQuery};

use crate::agent::AgentView;

/// Decides whether the agent should interact with the cell it faces.
#[derive(Clone, Debug)]
pub struct ActionDecider {
    cooldown: Duration,
    last_action_at: Option<Duration>,
    last_success: bool,
}

impl ActionDecider {
    /// Creates a decider that never acts twice within `cooldown`.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_action_at: None,
            last_success: false,
        }
    }

    /// Reports whether the cooldown has elapsed at simulated time `now`.
    #[must_use]
    pub fn ready(&self, now: Duration) -> bool {
        self.last_action_at
            .map_or(true, |last| now.saturating_sub(last) >= self.cooldown)
    }

    /// Recommends an interaction when a resource is ahead, or when an obstacle
    /// ahead lies on the committed route and a credit is available to clear it.
    #[must_use]
    pub fn should_act<G>(&self, grid: &G, view: &AgentView, credits: u32, now: Duration) -> bool
    where
        G: GridQuery + ?Sized,
    {
        if !self.ready(now) {
            return false;
        }

        let ahead = view.position.step(view.facing);
        match grid.classify(ahead) {
            CellKind::Resource => true,
            CellKind::Obstacle => {
                credits > 0
                    && view
                        .route
                        .as_ref()
                        .map_or(false, |route| route.contains(ahead))
            }
            CellKind::Empty | CellKind::Agent | CellKind::OutOfBounds => false,
        }
    }

    /// Records the outcome of an attempted interaction.
    pub fn record(&mut self, success: bool, now: Duration) {
        self.last_action_at = Some(now);
        self.last_success = success;
    }

    /// Reports whether an interaction succeeded at exactly `now`, in which
    /// case the agent must not also move this tick.
    #[must_use]
    pub fn acted_at(&self, now: Duration) -> bool {
        self.last_success && self.last_action_at == Some(now)
    }
}
