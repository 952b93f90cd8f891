//! Adapter that lets an AI controller act on the world through commands.

use cave_in_core::{ActionInterface, Command, Direction, Event, Movement, Position};

use crate::{apply, World};

/// Routes agent actions through [`apply`] and records the resulting events.
#[derive(Debug)]
pub struct AgentControls<'w> {
    world: &'w mut World,
    events: &'w mut Vec<Event>,
}

impl<'w> AgentControls<'w> {
    /// Wraps the world and the event buffer that receives every emitted event.
    pub fn new(world: &'w mut World, events: &'w mut Vec<Event>) -> Self {
        Self { world, events }
    }

    fn execute(&mut self, command: Command) -> &[Event] {
        let before = self.events.len();
        apply(self.world, command, self.events);
        &self.events[before..]
    }
}

impl ActionInterface for AgentControls<'_> {
    fn current_position(&self) -> Option<Position> {
        Some(self.world.agent.position)
    }

    fn current_facing(&self) -> Option<Direction> {
        Some(self.world.agent.facing)
    }

    fn try_move(&mut self, movement: Movement) -> bool {
        let Some(direction) = Direction::from_movement(movement) else {
            return false;
        };
        self.execute(Command::MoveAgent { direction })
            .iter()
            .any(|event| matches!(event, Event::AgentMoved { .. }))
    }

    fn try_interact(&mut self) -> bool {
        self.execute(Command::Interact).iter().any(|event| {
            matches!(
                event,
                Event::ResourceCollected { .. } | Event::ObstacleCleared { .. }
            )
        })
    }
}
