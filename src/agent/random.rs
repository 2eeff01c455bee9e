//! A uniformly random baseline opponent.

use log::debug;

use crate::core::{Color, EngineConfig, SearchRng};
use crate::game::{Game, Observation};

use super::Agent;

/// Plays uniformly at random over the favourable legal actions.
///
/// Useful as an evaluation opponent and as a cheap driver for tests; it
/// performs no search.
pub struct RandomAgent {
    config: EngineConfig,
    game: Option<Game>,
    rng: SearchRng,
}

impl RandomAgent {
    /// Create a random agent.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let rng = SearchRng::new(config.random_seed);
        Self {
            config,
            game: None,
            rng,
        }
    }

    fn game(&self) -> &Game {
        self.game
            .as_ref()
            .expect("agent has no game; call reset() first")
    }

    fn uniform_choice(&mut self) -> (usize, Vec<f32>) {
        let num_actions = self.config.rules.num_actions();
        let legal_actions = self.game().favourable_legal_actions().to_vec();
        let action_idx = self.rng.gen_range_usize(0..legal_actions.len());

        let mut policy = vec![0.0; num_actions];
        let p = 1.0 / legal_actions.len() as f32;
        for &action in &legal_actions {
            policy[action] = p;
        }
        debug!("sampled action index {}", action_idx);
        (action_idx, policy)
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "Random player"
    }

    fn reset(&mut self) {
        self.game = Some(Game::new(self.config.rules));
    }

    fn search(&mut self) {}

    fn exploit(&mut self) -> (usize, Vec<f32>) {
        self.uniform_choice()
    }

    fn explore(&mut self) -> (usize, Vec<f32>) {
        self.uniform_choice()
    }

    fn step(&mut self, action_idx: usize) {
        let game = self
            .game
            .as_mut()
            .expect("agent has no game; call reset() first");
        let action = game.favourable_legal_actions()[action_idx];
        game.step(action);
        debug!("taking move {}", action);
    }

    fn observation(&self) -> Observation {
        self.game().observation()
    }

    fn outcome(&self) -> f32 {
        self.game().outcome()
    }

    fn finished(&self) -> bool {
        self.game().finished()
    }

    fn color(&self) -> Color {
        self.game().color()
    }

    fn favourable_legal_actions(&self) -> &[usize] {
        self.game().favourable_legal_actions()
    }
}
