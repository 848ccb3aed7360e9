use crate::types::{Direction, Disposition};

use super::{ControlContext, Controller, Steer};

/// Heads along the axis with the larger gap to the nearest target, trying the
/// other axis when the first is walled. Gets stuck in dead ends.
#[derive(Debug)]
pub struct GreedyController {
    name: String,
}

impl GreedyController {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Controller for GreedyController {
    fn next_direction(&mut self, ctx: &ControlContext<'_>) -> Steer {
        let Some(target) = ctx.nearest_target() else {
            return Steer::stop();
        };
        let disposition = Disposition::facing(target.mode());

        let from = ctx.actor.cell();
        let to = target.cell();
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        let horizontal = match dx.signum() {
            1 => Direction::Right,
            -1 => Direction::Left,
            _ => Direction::Stopped,
        };
        let vertical = match dy.signum() {
            1 => Direction::Down,
            -1 => Direction::Up,
            _ => Direction::Stopped,
        };
        let (primary, secondary) = if dx.abs() >= dy.abs() {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };

        let direction = if ctx.actor.can_apply_movement(ctx.map, primary) {
            primary
        } else {
            secondary
        };
        Steer::chasing(direction, disposition)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
