//! Core types: colors, configuration, deterministic RNG.

pub mod color;
pub mod config;
pub mod rng;

pub use color::Color;
pub use config::{EngineConfig, GoRules};
pub use rng::SearchRng;
