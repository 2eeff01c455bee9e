//! # sente
//!
//! A parallel Monte Carlo Tree Search engine for small-board Go, coupled
//! with a batching neural-network predictor. It produces self-play
//! experience (observation, search policy, outcome) for an AlphaZero-style
//! training pipeline.
//!
//! ## Design Principles
//!
//! 1. **One shared tree**: `predict_batch_size` worker threads probe the
//!    same tree, coordinated only by per-edge virtual loss.
//!
//! 2. **Batched evaluation**: workers block on a rendezvous channel; the
//!    predictor aggregates requests into one forward pass per batch.
//!
//! 3. **Explicit configuration**: an `EngineConfig` value is threaded
//!    through constructors. No process-global state.
//!
//! ## Modules
//!
//! - `core`: colors, configuration, seeded RNG
//! - `game`: Go position engine (legal moves, captures, scoring, observation)
//! - `predict`: `Evaluator` trait and the batching `PredictService`
//! - `mcts`: shared search tree and the PUCT `SearchAgent`
//! - `agent`: the game-playing agent façade and a random baseline
//! - `record`: SGF game records
//! - `training`: experience trajectories, self-play and evaluation drivers

pub mod agent;
pub mod core;
pub mod game;
pub mod mcts;
pub mod predict;
pub mod record;
pub mod training;

// Re-export commonly used types
pub use crate::core::{Color, EngineConfig, GoRules, SearchRng};

pub use crate::game::{BoardDiff, DiffRing, Game, Observation};

pub use crate::predict::{Evaluator, PredictService, Request, Response, UniformEvaluator};

pub use crate::mcts::{Node, SearchAgent};

pub use crate::agent::{Agent, RandomAgent};

pub use crate::record::GameRecord;

pub use crate::training::{Example, SelfPlayRunner, Trajectory};
