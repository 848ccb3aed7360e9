//! The generic movement engine shared by both actor variants.
//!
//! Positions are a grid [`Cell`] plus a fixed-point [`Offset`] on a
//! 60-step scale. An actor may only change direction while it sits exactly on
//! a cell boundary; mid-cell it keeps its committed direction.

use serde::Serialize;

use crate::constants::OFFSET_STEPS;
use crate::map::{CellKind, Map};
use crate::types::{Cell, Direction, Offset, Speed};

mod pursued;
mod pursuer;

pub use self::pursued::Pursued;
pub use self::pursuer::Pursuer;

/// Which side of the chase an actor is on; decides what counts as a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Pursued,
    Pursuer,
}

impl ActorKind {
    /// Pursued actors treat the pen line as a wall, pursuers walk through it.
    pub fn passable(self, kind: CellKind) -> bool {
        match self {
            Self::Pursued => !kind.is_wall_or_line(),
            Self::Pursuer => !kind.is_wall(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Motion {
    kind: ActorKind,
    cell: Cell,
    offset: Offset,
    direction: Direction,
    desired: Direction,
    speed: Speed,
    spawn: Cell,
    moved_last_tick: bool,
}

impl Motion {
    pub fn new(kind: ActorKind, spawn: Cell, speed: Speed) -> Self {
        Self {
            kind,
            cell: spawn,
            offset: Offset::ZERO,
            direction: Direction::Stopped,
            desired: Direction::Stopped,
            speed,
            spawn,
            moved_last_tick: false,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn desired_direction(&self) -> Direction {
        self.desired
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn spawn(&self) -> Cell {
        self.spawn
    }

    pub fn moved_last_tick(&self) -> bool {
        self.moved_last_tick
    }

    pub fn at_boundary(&self) -> bool {
        self.offset.is_zero()
    }

    /// Interpolated position in cell units, for rendering and precise collisions.
    pub fn position(&self) -> (f32, f32) {
        let (fx, fy) = self.offset.fraction();
        (self.cell.x as f32 + fx, self.cell.y as f32 + fy)
    }

    /// Where one step in `direction` would land, or `None` when a wall is in the way.
    pub fn probe(&self, map: &Map, direction: Direction) -> Option<(Cell, Offset)> {
        let step = self.speed.step();
        let mut x = self.cell.x;
        let mut y = self.cell.y;
        let mut offset = self.offset;

        match direction {
            Direction::Stopped => return None,
            Direction::Up => {
                offset.y -= step;
                if offset.y < 0 {
                    offset.y += OFFSET_STEPS;
                    y -= 1;
                }
            }
            Direction::Down => {
                offset.y += step;
                if offset.y >= OFFSET_STEPS {
                    offset.y -= OFFSET_STEPS;
                    y += 1;
                }
            }
            Direction::Left => {
                offset.x -= step;
                if offset.x < 0 {
                    offset.x += OFFSET_STEPS;
                    x -= 1;
                }
            }
            Direction::Right => {
                offset.x += step;
                if offset.x >= OFFSET_STEPS {
                    offset.x -= OFFSET_STEPS;
                    x += 1;
                }
            }
        }

        let landing = map.wrap(x, y);
        // While straddling two cells the one ahead must be open too, or the
        // actor would clip a wall corner.
        let mut ahead = landing;
        if offset.y > 0 {
            ahead = map.neighbour(ahead, 0, 1);
        }
        if offset.x > 0 {
            ahead = map.neighbour(ahead, 1, 0);
        }

        if self.kind.passable(map.kind(landing)) && self.kind.passable(map.kind(ahead)) {
            Some((landing, offset))
        } else {
            None
        }
    }

    pub fn can_apply_movement(&self, map: &Map, direction: Direction) -> bool {
        self.probe(map, direction).is_some()
    }

    /// Advances one tick. Turning is only attempted on a cell boundary; a
    /// blocked actor snaps to [`Direction::Stopped`].
    pub fn advance(&mut self, map: &Map, desired: Direction) -> bool {
        self.desired = desired;

        if desired != Direction::Stopped && self.offset.is_zero() && desired != self.direction {
            if let Some((cell, offset)) = self.probe(map, desired) {
                self.direction = desired;
                self.commit(cell, offset);
                return true;
            }
        }

        match self.probe(map, self.direction) {
            Some((cell, offset)) => {
                self.commit(cell, offset);
                true
            }
            None => {
                self.direction = Direction::Stopped;
                self.moved_last_tick = false;
                false
            }
        }
    }

    fn commit(&mut self, cell: Cell, offset: Offset) {
        self.cell = cell;
        self.offset = offset;
        self.moved_last_tick = true;
    }

    /// Back to the spawn cell, stopped.
    pub fn reset(&mut self) {
        self.cell = self.spawn;
        self.offset = Offset::ZERO;
        self.direction = Direction::Stopped;
        self.desired = Direction::Stopped;
        self.moved_last_tick = false;
    }

    /// The cell being entered: the one ahead while moving down or right
    /// mid-cell, the current cell otherwise.
    pub fn lookahead_cell(&self, map: &Map) -> Cell {
        match self.direction {
            Direction::Down if self.offset.y > 0 => map.neighbour(self.cell, 0, 1),
            Direction::Right if self.offset.x > 0 => map.neighbour(self.cell, 1, 0),
            _ => self.cell,
        }
    }

    /// Cheap cell-adjacency filter first, then the interpolated distance.
    pub fn collides(&self, other: &Motion, map: &Map) -> bool {
        let gap_x = torus_gap(self.cell.x, other.cell.x, map.width());
        let gap_y = torus_gap(self.cell.y, other.cell.y, map.height());
        if gap_x > 1 || gap_y > 1 {
            return false;
        }
        let (ax, ay) = self.position();
        let (bx, by) = other.position();
        torus_gap_f32(ax, bx, map.width()) < 1.0 && torus_gap_f32(ay, by, map.height()) < 1.0
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, cell: Cell, offset: Offset, direction: Direction) {
        self.cell = cell;
        self.offset = offset;
        self.direction = direction;
    }
}

fn torus_gap(a: i32, b: i32, size: i32) -> i32 {
    let d = (a - b).abs();
    d.min(size - d)
}

fn torus_gap_f32(a: f32, b: f32, size: i32) -> f32 {
    let d = (a - b).abs();
    d.min(size as f32 - d)
}
