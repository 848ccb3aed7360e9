//! Observer contracts for status displays.
//!
//! Every callback runs on the tick task, synchronously, so implementations
//! must return quickly. All methods default to no-ops.

use crate::types::PursuedMode;

pub trait PursuedListener: Send {
    fn mode_changed(&mut self, _mode: PursuedMode) {}
    fn lives_changed(&mut self, _lives: i32) {}
    fn score_changed(&mut self, _score: u32) {}
}

pub trait PursuerListener: Send {
    /// Times this pursuer caught a pursued actor.
    fn captures_changed(&mut self, _count: u32) {}
    /// Times this pursuer was eaten by an empowered pursued actor.
    fn times_captured_changed(&mut self, _count: u32) {}
}

pub trait RoundListener: Send {
    fn time_tick(&mut self, _elapsed_seconds: i64, _remaining_seconds: i64) {}
    fn map_name_set(&mut self, _name: &str) {}
    fn round_started(&mut self) {}
    /// Every pursued actor went down; positions and timer were reset.
    fn sub_round_started(&mut self) {}
    fn round_lost(&mut self) {}
    fn round_won(&mut self) {}
}
