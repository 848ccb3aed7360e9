//! Steering strategies. A controller is asked once per tick for the
//! direction its actor should try next.

use crate::actor::{Motion, Pursued};
use crate::map::Map;
use crate::types::{Cell, Direction, Disposition};

mod greedy;
mod input;
mod pathfinding;
mod random;
mod registry;

pub use self::greedy::GreedyController;
pub use self::input::{InputBinding, InputController};
pub use self::pathfinding::PathfindingController;
pub use self::random::RandomController;
pub use self::registry::{ControllerRegistry, StrategyKind};

/// What a controller sees when deciding.
pub struct ControlContext<'a> {
    pub actor: &'a Motion,
    pub map: &'a Map,
    pub pursued: &'a [Pursued],
}

impl ControlContext<'_> {
    pub fn nearest_target(&self) -> Option<&Pursued> {
        nearest_pursued(self.actor.cell(), self.pursued)
    }
}

/// A steering decision. `disposition` is only set by chasing strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Steer {
    pub direction: Direction,
    pub disposition: Option<Disposition>,
}

impl Steer {
    pub fn go(direction: Direction) -> Self {
        Self {
            direction,
            disposition: None,
        }
    }

    pub fn chasing(direction: Direction, disposition: Disposition) -> Self {
        Self {
            direction,
            disposition: Some(disposition),
        }
    }

    pub fn stop() -> Self {
        Self::go(Direction::Stopped)
    }
}

pub trait Controller: Send {
    fn next_direction(&mut self, ctx: &ControlContext<'_>) -> Steer;
    fn name(&self) -> &str;
}

/// The closest pursued actor that is still in play, by squared cell distance.
/// Ties go to the earlier actor.
pub fn nearest_pursued(from: Cell, pursued: &[Pursued]) -> Option<&Pursued> {
    let mut best: Option<(&Pursued, i32)> = None;
    for candidate in pursued.iter().filter(|p| p.is_active()) {
        let distance = from.squared_distance(candidate.cell());
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best.map(|(pursued, _)| pursued)
}
