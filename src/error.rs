//! Error types surfaced before a round can start.
//!
//! Movement and path search never fail; blocked moves and unreachable targets
//! resolve to [`Direction::Stopped`](crate::types::Direction::Stopped).

use std::path::PathBuf;

use crate::actor::ActorKind;

/// Failures while reading or parsing a map definition.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("map definition is empty, expected a `<width> <height>` header")]
    MissingHeader,

    #[error("invalid map header {header:?}, expected `<width> <height>`")]
    InvalidHeader { header: String },

    #[error("malformed map: row {row} has {found} columns, expected {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("malformed map: found {found} rows, expected {expected}")]
    MissingRows { expected: usize, found: usize },

    #[error("malformed map: unknown symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: char },
}

/// Invalid actor or controller wiring detected while building a round.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("a round needs at least one pursued actor")]
    NoPursued,

    #[error("requested {requested} {kind:?} actors but the map has {available} spawn cells")]
    NotEnoughSpawns {
        kind: ActorKind,
        requested: usize,
        available: usize,
    },

    #[error("requested {requested} input-bound actors but only {available} bindings are registered")]
    NotEnoughInputs { requested: usize, available: usize },

    #[error("{input} input-bound pursuers exceed the {total} pursuers requested")]
    TooManyInputPursuers { input: usize, total: usize },

    #[error("no AI strategies registered for {count} pursuers")]
    EmptyRoster { count: usize },

    #[error("tick period must be positive")]
    ZeroTick,
}

/// Failures while loading a [`GameConfig`](crate::config::GameConfig) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
