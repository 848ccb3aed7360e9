use crate::constants::RANDOM_REROLL_CHANCE;
use crate::rng::Rng;
use crate::types::{Direction, Disposition};

use super::{ControlContext, Controller, Steer};

/// Wanders: keeps its heading until blocked, with an occasional re-roll.
#[derive(Debug)]
pub struct RandomController {
    name: String,
    rng: Rng,
    heading: Direction,
}

impl RandomController {
    pub fn new(name: impl Into<String>, rng: Rng) -> Self {
        Self {
            name: name.into(),
            rng,
            heading: Direction::Up,
        }
    }
}

impl Controller for RandomController {
    fn next_direction(&mut self, ctx: &ControlContext<'_>) -> Steer {
        if !ctx.actor.moved_last_tick() {
            self.heading = self.rng.direction_other_than(self.heading);
        } else if self.rng.chance(RANDOM_REROLL_CHANCE) {
            self.heading = self.rng.direction();
        }

        Steer {
            direction: self.heading,
            disposition: ctx
                .nearest_target()
                .map(|target| Disposition::facing(target.mode())),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, Motion, Pursued};
    use crate::map::Map;
    use crate::types::{Cell, Speed};

    #[test]
    fn rerolls_away_from_a_failed_heading() {
        let map = Map::parse("box", "3 3\nHHH\nH H\nHHH\n").expect("box parses");
        let mut actor = Motion::new(ActorKind::Pursuer, Cell::new(1, 1), Speed::Normal);
        let mut controller = RandomController::new("Random #1", Rng::new(7));

        let mut previous = Direction::Up;
        for _ in 0..20 {
            let ctx = ControlContext {
                actor: &actor,
                map: &map,
                pursued: &[],
            };
            let steer = controller.next_direction(&ctx);
            assert_ne!(steer.direction, previous);
            assert_ne!(steer.direction, Direction::Stopped);
            assert_eq!(steer.disposition, None);
            previous = steer.direction;
            assert!(!actor.advance(&map, steer.direction));
        }
    }

    #[test]
    fn mostly_holds_heading_while_moving() {
        let map = Map::parse("open", "5 5\n     \n     \n     \n     \n     \n")
            .expect("open parses");
        let mut actor = Motion::new(ActorKind::Pursuer, Cell::new(2, 2), Speed::Normal);
        assert!(actor.advance(&map, Direction::Up));
        let pursued = vec![Pursued::new("p", Cell::new(0, 0), Speed::VeryFast, 3, None)];
        let ctx = ControlContext {
            actor: &actor,
            map: &map,
            pursued: &pursued,
        };

        let mut controller = RandomController::new("Random #1", Rng::new(11));
        let mut changes = 0;
        let mut previous = Direction::Up;
        for _ in 0..200 {
            let steer = controller.next_direction(&ctx);
            assert_eq!(steer.disposition, Some(Disposition::Pursuing));
            if steer.direction != previous {
                changes += 1;
            }
            previous = steer.direction;
        }
        assert!(changes < 40, "changed heading {changes} times");
    }

    #[test]
    fn same_seed_wanders_the_same_way() {
        let map = Map::parse("box", "3 3\nHHH\nH H\nHHH\n").expect("box parses");
        let actor = Motion::new(ActorKind::Pursuer, Cell::new(1, 1), Speed::Normal);
        let ctx = ControlContext {
            actor: &actor,
            map: &map,
            pursued: &[],
        };
        let mut a = RandomController::new("a", Rng::new(3));
        let mut b = RandomController::new("b", Rng::new(3));
        for _ in 0..30 {
            assert_eq!(a.next_direction(&ctx), b.next_direction(&ctx));
        }
    }
}
