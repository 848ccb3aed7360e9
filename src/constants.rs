use crate::types::Speed;

pub const TICK_MS: u64 = 33;

pub const OFFSET_STEPS: i32 = 60;

pub const ROUND_SECONDS: i64 = 180;
pub const EMPOWERED_MS: u64 = 15_000;

pub const POINTS_NORMAL: u32 = 1;
pub const POINTS_EMPOWERED: u32 = 3;
pub const POINTS_EAT_PURSUER: u32 = 100;

pub const DEFAULT_LIVES: i32 = 3;
pub const MAX_COST: u32 = 99;
pub const RANDOM_REROLL_CHANCE: f32 = 0.05;

pub const DEFAULT_PURSUED_COUNT: usize = 1;
pub const DEFAULT_PURSUER_COUNT: usize = 4;
pub const DEFAULT_LEVEL: u8 = 2;

pub fn pursuer_speed_for_level(level: u8) -> Speed {
    match level {
        1 => Speed::Slow,
        2 => Speed::Normal,
        3 => Speed::Fast,
        4 => Speed::VeryFast,
        _ => Speed::Normal,
    }
}
