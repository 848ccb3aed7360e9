use std::collections::{HashSet, VecDeque};
use std::path::Path;

use crate::error::MapError;
use crate::types::{Cell, MapView};

pub const SYMBOL_EMPTY: char = ' ';
pub const SYMBOL_SMALL: char = '.';
pub const SYMBOL_SMALL_ALT: char = '·';
pub const SYMBOL_BIG: char = 'o';
pub const SYMBOL_LINE: char = '-';
pub const SYMBOL_PURSUER_START: char = 'G';
pub const SYMBOL_PURSUED_START: char = 'P';

/// Wall geometry, only meaningful to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WallShape {
    Full,
    VerticalLeft,
    VerticalRight,
    HorizontalTop,
    HorizontalBottom,
    Diag45Top,
    Diag45Bottom,
    Diag135Top,
    Diag135Bottom,
    Diag225Top,
    Diag225Bottom,
    Diag315Top,
    Diag315Bottom,
}

impl WallShape {
    const SYMBOLS: [(char, WallShape); 13] = [
        ('H', WallShape::Full),
        ('a', WallShape::VerticalLeft),
        ('b', WallShape::VerticalRight),
        ('c', WallShape::HorizontalTop),
        ('d', WallShape::HorizontalBottom),
        ('e', WallShape::Diag45Top),
        ('f', WallShape::Diag45Bottom),
        ('g', WallShape::Diag135Top),
        ('h', WallShape::Diag135Bottom),
        ('i', WallShape::Diag225Top),
        ('j', WallShape::Diag225Bottom),
        ('k', WallShape::Diag315Top),
        ('l', WallShape::Diag315Bottom),
    ];

    fn from_symbol(symbol: char) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .find(|(c, _)| *c == symbol)
            .map(|(_, shape)| *shape)
    }

    fn symbol(self) -> char {
        Self::SYMBOLS
            .iter()
            .find(|(_, shape)| *shape == self)
            .map(|(c, _)| *c)
            .unwrap_or('H')
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    SmallCollectible,
    BigCollectible,
    /// Gate line over the pursuer pen: open to pursuers, a wall to pursued actors.
    Line,
    Wall(WallShape),
}

impl CellKind {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            SYMBOL_EMPTY => Some(Self::Empty),
            SYMBOL_SMALL | SYMBOL_SMALL_ALT => Some(Self::SmallCollectible),
            SYMBOL_BIG => Some(Self::BigCollectible),
            SYMBOL_LINE => Some(Self::Line),
            other => WallShape::from_symbol(other).map(Self::Wall),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Empty => SYMBOL_EMPTY,
            Self::SmallCollectible => SYMBOL_SMALL,
            Self::BigCollectible => SYMBOL_BIG,
            Self::Line => SYMBOL_LINE,
            Self::Wall(shape) => shape.symbol(),
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Self::Wall(_))
    }

    pub fn is_wall_or_line(self) -> bool {
        matches!(self, Self::Wall(_) | Self::Line)
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Self::SmallCollectible | Self::BigCollectible)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumed {
    None,
    Small,
    Big,
}

/// Toroidal grid of cell kinds plus spawn lists and the collectible counter.
#[derive(Clone, Debug)]
pub struct Map {
    name: String,
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
    remaining: i32,
    pursued_spawns: Vec<Cell>,
    pursuer_spawns: Vec<Cell>,
}

impl Map {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let map = Self::parse(&name, &text)?;
        tracing::info!(
            map = %map.name,
            width = map.width,
            height = map.height,
            collectibles = map.remaining,
            "map loaded"
        );
        Ok(map)
    }

    pub fn parse(name: &str, text: &str) -> Result<Self, MapError> {
        let mut lines = text.lines().map(|line| line.strip_suffix('\r').unwrap_or(line));
        let header = lines.next().ok_or(MapError::MissingHeader)?;
        let (width, height) = parse_header(header)?;

        // The header alone never sizes the allocation; the text bounds it.
        let mut cells = Vec::with_capacity((width * height).min(text.len()));
        let mut remaining = 0;
        let mut pursued_spawns = Vec::new();
        let mut pursuer_spawns = Vec::new();

        for row in 0..height {
            let Some(line) = lines.next() else {
                return Err(MapError::MissingRows {
                    expected: height,
                    found: row,
                });
            };
            let found = line.chars().count();
            if found != width {
                return Err(MapError::MalformedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let here = Cell::new(col as i32, row as i32);
                let kind = match symbol {
                    SYMBOL_PURSUED_START => {
                        pursued_spawns.push(here);
                        CellKind::Empty
                    }
                    SYMBOL_PURSUER_START => {
                        pursuer_spawns.push(here);
                        CellKind::Empty
                    }
                    other => CellKind::from_symbol(other).ok_or(MapError::UnknownSymbol {
                        row,
                        col,
                        symbol: other,
                    })?,
                };
                if kind.is_collectible() {
                    remaining += 1;
                }
                cells.push(kind);
            }
        }

        Ok(Self {
            name: name.to_string(),
            width: width as i32,
            height: height as i32,
            cells,
            remaining,
            pursued_spawns,
            pursuer_spawns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn remaining_collectibles(&self) -> i32 {
        self.remaining
    }

    pub fn pursued_spawns(&self) -> &[Cell] {
        &self.pursued_spawns
    }

    pub fn pursuer_spawns(&self) -> &[Cell] {
        &self.pursuer_spawns
    }

    /// Wraps any coordinate onto the torus.
    pub fn wrap(&self, x: i32, y: i32) -> Cell {
        Cell::new(x.rem_euclid(self.width), y.rem_euclid(self.height))
    }

    pub fn index_of(&self, cell: Cell) -> usize {
        let cell = self.wrap(cell.x, cell.y);
        (cell.y * self.width + cell.x) as usize
    }

    pub fn cell_at_index(&self, index: usize) -> Cell {
        let index = index as i32;
        Cell::new(index % self.width, index / self.width)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn kind(&self, cell: Cell) -> CellKind {
        self.cells[self.index_of(cell)]
    }

    pub fn neighbour(&self, cell: Cell, dx: i32, dy: i32) -> Cell {
        self.wrap(cell.x + dx, cell.y + dy)
    }

    /// Clears a collectible at `cell`; repeated calls on an emptied cell are no-ops.
    pub fn consume_collectible(&mut self, cell: Cell) -> Consumed {
        let index = self.index_of(cell);
        let consumed = match self.cells[index] {
            CellKind::SmallCollectible => Consumed::Small,
            CellKind::BigCollectible => Consumed::Big,
            _ => return Consumed::None,
        };
        self.cells[index] = CellKind::Empty;
        self.remaining -= 1;
        consumed
    }

    pub fn all_collectibles_consumed(&self) -> bool {
        self.remaining <= 0
    }

    /// Cells reachable from `start` through cells accepted by `passable`, torus-aware.
    pub fn reachable_from(&self, start: Cell, passable: impl Fn(CellKind) -> bool) -> HashSet<Cell> {
        let mut out = HashSet::new();
        let start = self.wrap(start.x, start.y);
        if !passable(self.kind(start)) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = self.neighbour(cell, dx, dy);
                if !passable(self.kind(next)) {
                    continue;
                }
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }

    /// Collectible cells a pursued actor spawning at `start` can never reach.
    pub fn unreachable_collectibles(&self, start: Cell) -> Vec<Cell> {
        let reachable = self.reachable_from(start, |kind| !kind.is_wall_or_line());
        (0..self.cells.len())
            .filter(|&index| self.cells[index].is_collectible())
            .map(|index| self.cell_at_index(index))
            .filter(|cell| !reachable.contains(cell))
            .collect()
    }

    pub fn to_view(&self) -> MapView {
        MapView {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            tiles: self
                .cells
                .chunks(self.width as usize)
                .map(|row| row.iter().map(|kind| kind.symbol()).collect::<String>())
                .collect(),
            remaining_collectibles: self.remaining,
        }
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), MapError> {
    let invalid = || MapError::InvalidHeader {
        header: header.to_string(),
    };
    let mut parts = header.split_whitespace();
    let width = parts
        .next()
        .and_then(|value| value.parse::<usize>().ok())
        .ok_or_else(invalid)?;
    let height = parts
        .next()
        .and_then(|value| value.parse::<usize>().ok())
        .ok_or_else(invalid)?;
    if width == 0 || height == 0 || parts.next().is_some() {
        return Err(invalid());
    }
    // Coordinates and cell indices are i32 on the grid.
    let limit = i32::MAX as usize;
    match width.checked_mul(height) {
        Some(cells) if cells <= limit => Ok((width, height)),
        _ => Err(invalid()),
    }
}
