//! Engine configuration parameters.
//!
//! A single `EngineConfig` value is built by the driver and threaded
//! through every constructor that needs it. Nothing reads configuration
//! from global state.

use serde::{Deserialize, Serialize};

/// Rules of the game being played: board geometry, scoring, history depth.
///
/// Cheap to copy; every `Game` carries one.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GoRules {
    /// Side length of the square board.
    pub boardsize: usize,

    /// White's area-scoring compensation.
    pub komi: f32,

    /// Number of positions (current plus remembered) encoded per observation.
    pub history_size: usize,
}

impl Default for GoRules {
    fn default() -> Self {
        Self {
            boardsize: 5,
            komi: 5.5,
            history_size: 4,
        }
    }
}

impl GoRules {
    /// Number of intersections on the board.
    #[inline]
    #[must_use]
    pub fn board_length(&self) -> usize {
        self.boardsize * self.boardsize
    }

    /// The pass action index.
    #[inline]
    #[must_use]
    pub fn pass(&self) -> usize {
        self.board_length()
    }

    /// Size of the action space: every intersection plus pass.
    #[inline]
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.board_length() + 1
    }

    /// Number of channels in an observation tensor.
    #[inline]
    #[must_use]
    pub fn num_channels(&self) -> usize {
        2 * self.history_size + 1
    }
}

/// Search and self-play configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Game rules.
    pub rules: GoRules,

    /// Simultaneous simulation workers, and the predictor's maximum batch.
    pub predict_batch_size: usize,

    /// Simulation iterations each worker performs per `search()` call.
    pub nsims_per_worker: usize,

    /// PUCT exploration constant.
    pub policy_score_factor: f32,

    /// Safety cap on moves per self-play game.
    pub max_game_length: usize,

    /// Move index before which `explore()` is used; `exploit()` afterwards.
    pub exploration_length: usize,

    /// Seed for the agent's stochastic sampling.
    pub random_seed: u64,

    /// Experience examples collected into each output file.
    pub num_examples_per_file: usize,

    /// Directory prefix for experience files.
    pub exp_prefix: String,

    /// Directory prefix for SGF game records.
    pub record_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: GoRules::default(),
            predict_batch_size: 2,
            nsims_per_worker: 600,
            policy_score_factor: 1.0,
            max_game_length: 50,
            exploration_length: 3,
            random_seed: 3,
            num_examples_per_file: 200,
            exp_prefix: "exp".to_string(),
            record_prefix: "sgf".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config with the reference parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the board size.
    #[must_use]
    pub fn with_boardsize(mut self, boardsize: usize) -> Self {
        self.rules.boardsize = boardsize;
        self
    }

    /// Set white's komi.
    #[must_use]
    pub fn with_komi(mut self, komi: f32) -> Self {
        self.rules.komi = komi;
        self
    }

    /// Set the observation history depth.
    #[must_use]
    pub fn with_history_size(mut self, history_size: usize) -> Self {
        assert!(history_size >= 1, "history must include the current position");
        self.rules.history_size = history_size;
        self
    }

    /// Set the worker count / predictor batch size.
    #[must_use]
    pub fn with_predict_batch_size(mut self, n: usize) -> Self {
        assert!(n >= 1, "need at least one simulation worker");
        self.predict_batch_size = n;
        self
    }

    /// Set per-worker simulation iterations.
    #[must_use]
    pub fn with_nsims_per_worker(mut self, n: usize) -> Self {
        self.nsims_per_worker = n;
        self
    }

    /// Set the PUCT exploration constant.
    #[must_use]
    pub fn with_policy_score_factor(mut self, c: f32) -> Self {
        self.policy_score_factor = c;
        self
    }

    /// Set the per-game move cap.
    #[must_use]
    pub fn with_max_game_length(mut self, n: usize) -> Self {
        self.max_game_length = n;
        self
    }

    /// Set the exploration cutoff move index.
    #[must_use]
    pub fn with_exploration_length(mut self, n: usize) -> Self {
        self.exploration_length = n;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Total simulations performed by one `search()` call.
    #[must_use]
    pub fn sims_per_search(&self) -> usize {
        self.predict_batch_size * self.nsims_per_worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.rules.boardsize, 5);
        assert!((config.rules.komi - 5.5).abs() < f32::EPSILON);
        assert_eq!(config.rules.history_size, 4);
        assert_eq!(config.predict_batch_size, 2);
        assert!((config.policy_score_factor - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rules_derived_sizes() {
        let rules = GoRules::default();
        assert_eq!(rules.board_length(), 25);
        assert_eq!(rules.pass(), 25);
        assert_eq!(rules.num_actions(), 26);
        assert_eq!(rules.num_channels(), 9);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_boardsize(3)
            .with_komi(0.5)
            .with_predict_batch_size(4)
            .with_nsims_per_worker(10)
            .with_random_seed(99);

        assert_eq!(config.rules.boardsize, 3);
        assert_eq!(config.rules.board_length(), 9);
        assert_eq!(config.predict_batch_size, 4);
        assert_eq!(config.sims_per_search(), 40);
        assert_eq!(config.random_seed, 99);
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.rules.boardsize, deserialized.rules.boardsize);
        assert_eq!(config.random_seed, deserialized.random_seed);
    }
}
