use crate::constants::{EMPOWERED_MS, POINTS_EAT_PURSUER, POINTS_EMPOWERED, POINTS_NORMAL};
use crate::controller::Controller;
use crate::listener::PursuedListener;
use crate::map::{Consumed, Map};
use crate::types::{Cell, Direction, PursuedMode, PursuedView, Speed};

use super::{ActorKind, Motion};

/// The collectible-eating actor.
pub struct Pursued {
    pub(crate) motion: Motion,
    pub(crate) controller: Option<Box<dyn Controller>>,
    name: String,
    initial_lives: i32,
    lives: i32,
    score: u32,
    dead: bool,
    mode: PursuedMode,
    empowered_at_ms: u64,
    listener: Option<Box<dyn PursuedListener>>,
}

impl std::fmt::Debug for Pursued {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pursued")
            .field("name", &self.name)
            .field("motion", &self.motion)
            .field("lives", &self.lives)
            .field("score", &self.score)
            .field("dead", &self.dead)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Pursued {
    pub fn new(
        name: impl Into<String>,
        spawn: Cell,
        speed: Speed,
        lives: i32,
        controller: Option<Box<dyn Controller>>,
    ) -> Self {
        Self {
            motion: Motion::new(ActorKind::Pursued, spawn, speed),
            controller,
            name: name.into(),
            initial_lives: lives,
            lives,
            score: 0,
            dead: false,
            mode: PursuedMode::Normal,
            empowered_at_ms: 0,
            listener: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn cell(&self) -> Cell {
        self.motion.cell()
    }

    pub fn mode(&self) -> PursuedMode {
        self.mode
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Still in the round: the last life is played at zero lives.
    pub fn is_alive(&self) -> bool {
        self.lives >= 0
    }

    /// Down for the current life.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Eligible as a pursuit target and for moving this tick.
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.dead
    }

    pub fn empowered_until_ms(&self) -> Option<u64> {
        match self.mode {
            PursuedMode::Empowered => Some(self.empowered_at_ms + EMPOWERED_MS),
            PursuedMode::Normal => None,
        }
    }

    pub fn controller_name(&self) -> Option<&str> {
        self.controller.as_deref().map(|controller| controller.name())
    }

    /// Replays the current status to a freshly attached listener.
    pub fn set_listener(&mut self, mut listener: Box<dyn PursuedListener>) {
        listener.mode_changed(self.mode);
        listener.lives_changed(self.lives);
        listener.score_changed(self.score);
        self.listener = Some(listener);
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Movement, then consumption of the cell being entered, then the
    /// empowerment deadline check against `now_ms`.
    pub(crate) fn step(&mut self, map: &mut Map, desired: Direction, now_ms: u64) {
        self.motion.advance(map, desired);

        let entering = self.motion.lookahead_cell(map);
        if self.motion.kind().passable(map.kind(entering)) {
            match map.consume_collectible(entering) {
                Consumed::Small => self.add_points(self.collectible_points()),
                Consumed::Big => {
                    self.add_points(self.collectible_points());
                    self.empowered_at_ms = now_ms;
                    tracing::debug!(pursued = %self.name, at_ms = now_ms, "empowered");
                    self.set_mode(PursuedMode::Empowered);
                }
                Consumed::None => {}
            }
        }

        self.expire_empowerment(now_ms);
    }

    pub(crate) fn expire_empowerment(&mut self, now_ms: u64) {
        if self.mode == PursuedMode::Empowered
            && now_ms >= self.empowered_at_ms.saturating_add(EMPOWERED_MS)
        {
            self.set_mode(PursuedMode::Normal);
        }
    }

    /// Moves the empowerment window later by a paused span.
    pub(crate) fn shift_empowerment(&mut self, by_ms: u64) {
        if self.mode == PursuedMode::Empowered {
            self.empowered_at_ms = self.empowered_at_ms.saturating_add(by_ms);
        }
    }

    fn collectible_points(&self) -> u32 {
        match self.mode {
            PursuedMode::Normal => POINTS_NORMAL,
            PursuedMode::Empowered => POINTS_EMPOWERED,
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if let Some(listener) = self.listener.as_mut() {
            listener.score_changed(self.score);
        }
    }

    /// Caught by a pursuer while normal. Costs one life per down.
    pub fn capture(&mut self) {
        if self.dead {
            return;
        }
        self.lives -= 1;
        self.dead = true;
        tracing::debug!(pursued = %self.name, lives = self.lives, "pursued captured");
        if let Some(listener) = self.listener.as_mut() {
            listener.lives_changed(self.lives);
        }
    }

    /// Ate a pursuer while empowered.
    pub fn eat(&mut self) {
        self.add_points(POINTS_EAT_PURSUER);
    }

    /// New life in the same round: position and mode reset, lives and score kept.
    pub fn revive(&mut self) {
        self.motion.reset();
        self.dead = false;
        self.set_mode(PursuedMode::Normal);
    }

    /// Fresh round: lives and score back to their defaults.
    pub fn restart(&mut self) {
        self.revive();
        self.lives = self.initial_lives;
        self.score = 0;
        if let Some(listener) = self.listener.as_mut() {
            listener.lives_changed(self.lives);
            listener.score_changed(self.score);
        }
    }

    fn set_mode(&mut self, mode: PursuedMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if let Some(listener) = self.listener.as_mut() {
            listener.mode_changed(mode);
        }
    }

    pub fn to_view(&self) -> PursuedView {
        let (x, y) = self.motion.position();
        PursuedView {
            name: self.name.clone(),
            cell: self.motion.cell(),
            x,
            y,
            dir: self.motion.direction(),
            mode: self.mode,
            lives: self.lives,
            score: self.score,
            dead: self.dead,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Seen {
        Mode(PursuedMode),
        Lives(i32),
        Score(u32),
    }

    struct Recorder(Arc<Mutex<Vec<Seen>>>);

    impl PursuedListener for Recorder {
        fn mode_changed(&mut self, mode: PursuedMode) {
            self.0.lock().expect("recorder lock").push(Seen::Mode(mode));
        }
        fn lives_changed(&mut self, lives: i32) {
            self.0.lock().expect("recorder lock").push(Seen::Lives(lives));
        }
        fn score_changed(&mut self, score: u32) {
            self.0.lock().expect("recorder lock").push(Seen::Score(score));
        }
    }

    fn strip() -> Map {
        Map::parse("strip", "8 3\nHHHHHHHH\nH ..o. H\nHHHHHHHH\n").expect("strip parses")
    }

    fn walk_right(pursued: &mut Pursued, map: &mut Map, ticks: usize, start_ms: u64) -> u64 {
        let mut now = start_ms;
        for _ in 0..ticks {
            now += 33;
            pursued.step(map, Direction::Right, now);
        }
        now
    }

    #[test]
    fn eats_small_collectibles_on_entry() {
        let mut map = strip();
        let mut pursued = Pursued::new("p", Cell::new(1, 1), Speed::VeryFast, 3, None);
        pursued.step(&mut map, Direction::Right, 0);
        assert_eq!(pursued.score(), POINTS_NORMAL);
        assert_eq!(map.remaining_collectibles(), 3);
    }

    #[test]
    fn big_collectible_empowers_until_deadline() {
        let mut map = strip();
        let mut pursued = Pursued::new("p", Cell::new(3, 1), Speed::VeryFast, 3, None);
        let start = 1_000;
        pursued.step(&mut map, Direction::Right, start);
        assert_eq!(pursued.mode(), PursuedMode::Empowered);
        assert_eq!(pursued.empowered_until_ms(), Some(start + EMPOWERED_MS));

        pursued.expire_empowerment(start + EMPOWERED_MS - 1);
        assert_eq!(pursued.mode(), PursuedMode::Empowered);
        pursued.expire_empowerment(start + EMPOWERED_MS);
        assert_eq!(pursued.mode(), PursuedMode::Normal);
    }

    #[test]
    fn empowered_small_collectible_is_worth_more() {
        let mut map = strip();
        let mut pursued = Pursued::new("p", Cell::new(3, 1), Speed::VeryFast, 3, None);
        walk_right(&mut pursued, &mut map, 24, 0);
        assert_eq!(pursued.mode(), PursuedMode::Empowered);
        assert_eq!(pursued.score(), POINTS_NORMAL + POINTS_EMPOWERED);
    }

    #[test]
    fn capture_is_idempotent_within_a_life() {
        let mut pursued = Pursued::new("p", Cell::new(1, 1), Speed::VeryFast, 1, None);
        pursued.capture();
        pursued.capture();
        assert_eq!(pursued.lives(), 0);
        assert!(pursued.is_dead());
        assert!(pursued.is_alive());

        pursued.revive();
        assert!(!pursued.is_dead());
        pursued.capture();
        assert_eq!(pursued.lives(), -1);
        assert!(!pursued.is_alive());
    }

    #[test]
    fn restart_resets_lives_and_score_but_revive_does_not() {
        let mut map = strip();
        let mut pursued = Pursued::new("p", Cell::new(1, 1), Speed::VeryFast, 2, None);
        walk_right(&mut pursued, &mut map, 12, 0);
        pursued.capture();
        let score = pursued.score();
        assert!(score > 0);

        pursued.revive();
        assert_eq!(pursued.lives(), 1);
        assert_eq!(pursued.score(), score);
        assert_eq!(pursued.cell(), Cell::new(1, 1));

        pursued.capture();
        pursued.restart();
        assert_eq!(pursued.lives(), 2);
        assert_eq!(pursued.score(), 0);
        assert_eq!(pursued.mode(), PursuedMode::Normal);
    }

    #[test]
    fn listener_sees_status_changes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut map = strip();
        let mut pursued = Pursued::new("p", Cell::new(3, 1), Speed::VeryFast, 3, None);
        pursued.set_listener(Box::new(Recorder(Arc::clone(&seen))));
        pursued.step(&mut map, Direction::Right, 0);
        pursued.eat();
        pursued.capture();

        let seen = seen.lock().expect("recorder lock").clone();
        assert_eq!(
            seen,
            vec![
                Seen::Mode(PursuedMode::Normal),
                Seen::Lives(3),
                Seen::Score(0),
                Seen::Score(POINTS_NORMAL),
                Seen::Mode(PursuedMode::Empowered),
                Seen::Score(POINTS_NORMAL + POINTS_EAT_PURSUER),
                Seen::Lives(2),
            ]
        );
    }
}
