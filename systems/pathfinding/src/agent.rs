//! Agent orchestration: target selection, planning, movement and replanning.

use std::{collections::VecDeque, time::Duration};

use cave_in_core::{
    ActionInterface, AiController, Direction, Grid, GridQuery, Movement, Position, WorldSnapshot,
};

use crate::{
    config::PathfindingConfig,
    decider::ActionDecider,
    grid::LayoutSignature,
    optimizer::{PlannedRoute, RouteOptimizer},
    route::Route,
    scorer::PositionScorer,
    vector,
    visibility::VisibilityScanner,
};

/// Planning state of the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AgentState {
    /// No usable route; the agent stands still until one can be planned.
    #[default]
    Idle,
    /// A route is committed and the agent is advancing along it.
    Following,
    /// The committed route was exhausted or invalidated and must be recomputed.
    Replanning,
}

/// What the agent knows about itself between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentView {
    /// Cell the agent occupies.
    pub position: Position,
    /// Direction the agent faces.
    pub facing: Direction,
    /// Most recently committed route, if any.
    pub route: Option<Route>,
    /// Last successful movement.
    pub momentum: Option<Movement>,
}

/// Autonomous resource collector implementing [`AiController`].
#[derive(Debug)]
pub struct Agent {
    config: PathfindingConfig,
    optimizer: RouteOptimizer,
    decider: ActionDecider,
    state: AgentState,
    view: Option<AgentView>,
    pending: VecDeque<Position>,
    grid: Option<Grid>,
    observed: Option<LayoutSignature>,
    stalled: Option<(Position, u32)>,
    credits: u32,
    now: Duration,
    board_full: bool,
}

impl Agent {
    /// Creates an agent driven by the provided configuration.
    #[must_use]
    pub fn new(config: PathfindingConfig) -> Self {
        Self {
            config,
            optimizer: RouteOptimizer::new(&config),
            decider: ActionDecider::new(config.action_cooldown()),
            state: AgentState::Idle,
            view: None,
            pending: VecDeque::new(),
            grid: None,
            observed: None,
            stalled: None,
            credits: 0,
            now: Duration::ZERO,
            board_full: false,
        }
    }

    /// Current planning state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Latest view of the agent, once a snapshot with an agent was received.
    #[must_use]
    pub fn view(&self) -> Option<&AgentView> {
        self.view.as_ref()
    }

    /// Waypoints still to visit on the committed route.
    pub fn pending_waypoints(&self) -> impl Iterator<Item = Position> + '_ {
        self.pending.iter().copied()
    }

    fn replan(&mut self) {
        self.pending.clear();
        let planned = self.compute_plan();
        self.stalled = if planned.is_some() {
            None
        } else {
            self.planning_key()
        };
        let Some(view) = self.view.as_mut() else {
            self.state = AgentState::Idle;
            return;
        };

        match planned {
            Some(planned) => {
                self.pending.extend(planned.route.waypoints());
                view.route = Some(planned.route);
                self.state = if self.pending.is_empty() {
                    AgentState::Idle
                } else {
                    AgentState::Following
                };
            }
            None => {
                view.route = None;
                self.state = AgentState::Idle;
            }
        }
    }

    fn compute_plan(&self) -> Option<PlannedRoute> {
        if self.board_full {
            return None;
        }
        let (grid, view) = (self.grid.as_ref()?, self.view.as_ref()?);
        let position = view.position;

        let Some(target) = PositionScorer::new(grid).closest_resource(position) else {
            tracing::debug!("no resource to target");
            return None;
        };

        let waypoint = match self.config.visibility_radius {
            Some(radius) => VisibilityScanner::new(grid, radius).pick_visible_target(
                position,
                target,
                view.momentum,
            ),
            None => Some(target),
        };

        let planned = waypoint
            .and_then(|waypoint| self.optimizer.plan(grid, position, waypoint, self.credits))
            .or_else(|| {
                if waypoint == Some(target) {
                    None
                } else {
                    self.optimizer.plan(grid, position, target, self.credits)
                }
            });

        if planned.is_none() {
            tracing::debug!(
                x = target.x(),
                y = target.y(),
                credits = self.credits,
                "no route to target"
            );
        }
        planned
    }

    /// Planning only depends on the layout, the position and the credits, so a
    /// failed plan is not retried until one of them changes.
    fn planning_key(&self) -> Option<(Position, u32)> {
        self.view.as_ref().map(|view| (view.position, self.credits))
    }

    fn needs_plan(&self) -> bool {
        self.pending.is_empty() && (self.stalled.is_none() || self.stalled != self.planning_key())
    }

    fn sync_with(&mut self, actions: &dyn ActionInterface) {
        if let Some(view) = self.view.as_mut() {
            if let Some(position) = actions.current_position() {
                view.position = position;
            }
            if let Some(facing) = actions.current_facing() {
                view.facing = facing;
            }
        }
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(PathfindingConfig::default())
    }
}

impl AiController for Agent {
    fn get_movement(&mut self, actions: &mut dyn ActionInterface) -> Movement {
        if self.board_full || self.decider.acted_at(self.now) {
            return Movement::NONE;
        }

        self.sync_with(actions);
        let Some(position) = self.view.as_ref().map(|view| view.position) else {
            return Movement::NONE;
        };

        while self.pending.front() == Some(&position) {
            let _ = self.pending.pop_front();
        }
        if self.needs_plan() {
            self.replan();
        }
        let Some(&next) = self.pending.front() else {
            return Movement::NONE;
        };
        if !position.is_adjacent(next) {
            self.pending.clear();
            self.state = AgentState::Replanning;
            return Movement::NONE;
        }

        let movement = vector::movement_toward(position, next);
        let moved = actions.try_move(movement);
        self.sync_with(actions);
        if moved {
            let _ = self.pending.pop_front();
            if let Some(view) = self.view.as_mut() {
                view.momentum = Some(movement);
            }
            if self.pending.is_empty() {
                self.state = AgentState::Replanning;
            }
        }
        movement
    }

    fn should_use_action(&mut self, actions: &mut dyn ActionInterface) -> bool {
        if self.board_full {
            return false;
        }

        self.sync_with(actions);
        let (Some(grid), Some(view)) = (self.grid.as_ref(), self.view.as_ref()) else {
            return false;
        };
        if !self.decider.should_act(grid, view, self.credits, self.now) {
            return false;
        }

        let success = actions.try_interact();
        self.decider.record(success, self.now);
        if success {
            self.credits = self.credits.saturating_sub(u32::from(
                grid.is_obstacle(view.position.step(view.facing)),
            ));
        }
        success
    }

    fn update(&mut self, snapshot: &WorldSnapshot) {
        self.now = snapshot.elapsed;
        self.credits = snapshot.stats.resources_held;
        self.board_full = snapshot.board_full;

        let Some(agent) = snapshot.agent else {
            self.view = None;
            self.pending.clear();
            self.grid = None;
            self.state = AgentState::Idle;
            return;
        };

        let view = self.view.get_or_insert_with(|| AgentView {
            position: agent.position,
            facing: agent.facing,
            route: None,
            momentum: None,
        });
        view.position = agent.position;
        view.facing = agent.facing;
        self.grid = Some(snapshot.grid.clone());

        let signature = LayoutSignature::capture(&snapshot.grid);
        if self.observed.as_ref() != Some(&signature) {
            tracing::debug!(
                resources = signature.resource_count(),
                obstacles = signature.obstacle_count(),
                "layout changed, replanning"
            );
            self.observed = Some(signature);
            self.stalled = None;
            self.state = AgentState::Replanning;
            self.replan();
        } else if self.needs_plan() {
            self.replan();
        }
    }
}
