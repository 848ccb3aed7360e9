use serde::{Deserialize, Serialize};

use crate::constants::OFFSET_STEPS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stopped,
}

impl Direction {
    pub const MOVING: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit grid delta along the direction's axis.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Stopped => (0, 0),
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::Stopped => 4,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Up,
            1 => Self::Down,
            2 => Self::Left,
            3 => Self::Right,
            _ => Self::Stopped,
        }
    }
}

/// Speed tiers, each one a step size on the sub-cell scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    VerySlow,
    Slow,
    Normal,
    Fast,
    VeryFast,
}

impl Speed {
    pub fn step(self) -> i32 {
        match self {
            Self::VerySlow => 1,
            Self::Slow => 2,
            Self::Normal => 3,
            Self::Fast => 4,
            Self::VeryFast => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(self, other: Cell) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Fixed-point position inside a cell, each axis in `[0, OFFSET_STEPS)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn fraction(self) -> (f32, f32) {
        (
            self.x as f32 / OFFSET_STEPS as f32,
            self.y as f32 / OFFSET_STEPS as f32,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuedMode {
    Normal,
    Empowered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Pursuing,
    Fleeing,
}

impl Disposition {
    pub fn facing(mode: PursuedMode) -> Self {
        match mode {
            PursuedMode::Normal => Self::Pursuing,
            PursuedMode::Empowered => Self::Fleeing,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Ready,
    Running,
    Paused,
    Won,
    Lost,
    Terminated,
}

impl RoundState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Terminated)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MapView {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    #[serde(rename = "remainingCollectibles")]
    pub remaining_collectibles: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PursuedView {
    pub name: String,
    pub cell: Cell,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mode: PursuedMode,
    pub lives: i32,
    pub score: u32,
    pub dead: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PursuerView {
    pub name: String,
    pub cell: Cell,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub disposition: Disposition,
    pub captures: u32,
    #[serde(rename = "timesCaptured")]
    pub times_captured: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub state: RoundState,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: i64,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: i64,
    #[serde(rename = "remainingCollectibles")]
    pub remaining_collectibles: i32,
    pub pursued: Vec<PursuedView>,
    pub pursuers: Vec<PursuerView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Won,
    Lost,
    Terminated,
}
