//! Tile-based chase simulation: a grid map with sub-cell movement, pursued
//! and pursuer actors, pluggable steering strategies and a fixed-tick round
//! loop.

pub mod actor;
pub mod config;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod error;
pub mod listener;
pub mod map;
pub mod rng;
pub mod types;
