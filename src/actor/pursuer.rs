use crate::controller::Controller;
use crate::listener::PursuerListener;
use crate::map::Map;
use crate::types::{Cell, Direction, Disposition, PursuerView, Speed};

use super::{ActorKind, Motion};

/// An AI- or input-driven chaser. Walks through the pen line.
pub struct Pursuer {
    pub(crate) motion: Motion,
    pub(crate) controller: Option<Box<dyn Controller>>,
    disposition: Disposition,
    captures: u32,
    times_captured: u32,
    listener: Option<Box<dyn PursuerListener>>,
}

impl std::fmt::Debug for Pursuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pursuer")
            .field("name", &self.name())
            .field("motion", &self.motion)
            .field("disposition", &self.disposition)
            .field("captures", &self.captures)
            .field("times_captured", &self.times_captured)
            .finish()
    }
}

impl Pursuer {
    pub fn new(spawn: Cell, speed: Speed, controller: Option<Box<dyn Controller>>) -> Self {
        Self {
            motion: Motion::new(ActorKind::Pursuer, spawn, speed),
            controller,
            disposition: Disposition::Pursuing,
            captures: 0,
            times_captured: 0,
            listener: None,
        }
    }

    /// Named after whoever drives it.
    pub fn name(&self) -> &str {
        self.controller
            .as_deref()
            .map(|controller| controller.name())
            .unwrap_or("idle")
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn cell(&self) -> Cell {
        self.motion.cell()
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub(crate) fn set_disposition(&mut self, disposition: Disposition) {
        self.disposition = disposition;
    }

    pub fn captures(&self) -> u32 {
        self.captures
    }

    pub fn times_captured(&self) -> u32 {
        self.times_captured
    }

    pub fn set_listener(&mut self, mut listener: Box<dyn PursuerListener>) {
        listener.captures_changed(self.captures);
        listener.times_captured_changed(self.times_captured);
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub(crate) fn step(&mut self, map: &Map, desired: Direction) {
        self.motion.advance(map, desired);
    }

    /// Caught a normal pursued actor. The pursuer stays where it is.
    pub fn capture(&mut self) {
        self.captures += 1;
        if let Some(listener) = self.listener.as_mut() {
            listener.captures_changed(self.captures);
        }
    }

    /// Eaten by an empowered pursued actor: back to spawn.
    pub fn die(&mut self) {
        self.times_captured += 1;
        tracing::debug!(pursuer = %self.name(), times = self.times_captured, "pursuer eaten");
        self.motion.reset();
        if let Some(listener) = self.listener.as_mut() {
            listener.times_captured_changed(self.times_captured);
        }
    }

    pub(crate) fn reset_position(&mut self) {
        self.motion.reset();
        self.disposition = Disposition::Pursuing;
    }

    pub(crate) fn restart(&mut self) {
        self.reset_position();
        self.captures = 0;
        self.times_captured = 0;
        if let Some(listener) = self.listener.as_mut() {
            listener.captures_changed(0);
            listener.times_captured_changed(0);
        }
    }

    pub fn to_view(&self) -> PursuerView {
        let (x, y) = self.motion.position();
        PursuerView {
            name: self.name().to_string(),
            cell: self.motion.cell(),
            x,
            y,
            dir: self.motion.direction(),
            disposition: self.disposition,
            captures: self.captures,
            times_captured: self.times_captured,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    struct Counts(Arc<Mutex<(u32, u32)>>);

    impl PursuerListener for Counts {
        fn captures_changed(&mut self, count: u32) {
            self.0.lock().expect("counts lock").0 = count;
        }
        fn times_captured_changed(&mut self, count: u32) {
            self.0.lock().expect("counts lock").1 = count;
        }
    }

    fn corridor() -> Map {
        Map::parse("corridor", "6 3\nHHHHHH\n      \nHHHHHH\n").expect("corridor parses")
    }

    #[test]
    fn capture_and_die_track_separate_counters() {
        let counts = Arc::new(Mutex::new((0, 0)));
        let map = corridor();
        let mut pursuer = Pursuer::new(Cell::new(1, 1), Speed::Normal, None);
        pursuer.set_listener(Box::new(Counts(Arc::clone(&counts))));

        for _ in 0..25 {
            pursuer.step(&map, Direction::Right);
        }
        let moved_to = pursuer.cell();
        assert_ne!(moved_to, Cell::new(1, 1));

        pursuer.capture();
        assert_eq!(pursuer.cell(), moved_to);
        assert_eq!(*counts.lock().expect("counts lock"), (1, 0));

        pursuer.die();
        assert_eq!(pursuer.cell(), Cell::new(1, 1));
        assert_eq!(pursuer.motion().direction(), Direction::Stopped);
        assert_eq!(pursuer.captures(), 1);
        assert_eq!(pursuer.times_captured(), 1);
        assert_eq!(*counts.lock().expect("counts lock"), (1, 1));
    }

    #[test]
    fn restart_clears_counters() {
        let mut pursuer = Pursuer::new(Cell::new(1, 1), Speed::Normal, None);
        pursuer.capture();
        pursuer.die();
        pursuer.set_disposition(Disposition::Fleeing);
        pursuer.restart();
        assert_eq!(pursuer.captures(), 0);
        assert_eq!(pursuer.times_captured(), 0);
        assert_eq!(pursuer.disposition(), Disposition::Pursuing);
    }

    #[test]
    fn walks_through_the_pen_line() {
        let map = Map::parse("pen", "3 4\nH H\nH H\nH-H\nH H\n").expect("pen parses");
        let mut pursuer = Pursuer::new(Cell::new(1, 1), Speed::VeryFast, None);
        for _ in 0..24 {
            pursuer.step(&map, Direction::Down);
        }
        assert_eq!(pursuer.cell(), Cell::new(1, 3));
    }
}
