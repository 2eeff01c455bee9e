//! Per-game experience collection.

use serde::{Deserialize, Serialize};

use crate::game::Observation;

/// One experience record for the training pipeline.
///
/// The policy spans the full action space; the outcome is the signed
/// final game result from the perspective of the side to move at this
/// record's position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Example {
    /// Observation tensor at the decision point.
    pub observation: Observation,

    /// Search-derived policy (visit proportions or one-hot).
    pub policy: Vec<f32>,

    /// Signed game outcome, filled in once the game ends.
    pub outcome: f32,
}

/// The examples of one game, pending the final outcome.
///
/// Outcomes alternate sign per ply, so they can only be assigned once
/// the game is over; `finalize` walks the moves backwards flipping the
/// terminal outcome at every step.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    examples: Vec<Example>,
}

impl Trajectory {
    /// Start an empty trajectory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one decision point.
    pub fn push(&mut self, observation: Observation, policy: Vec<f32>) {
        self.examples.push(Example {
            observation,
            policy,
            outcome: 0.0,
        });
    }

    /// Number of recorded decision points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Assign outcomes and return the examples in game order.
    ///
    /// `outcome` is the terminal result for the side that would move
    /// next; each step backwards flips the sign, so every example ends up
    /// with the result from its own mover's perspective.
    #[must_use]
    pub fn finalize(mut self, terminal_outcome: f32) -> Vec<Example> {
        let mut outcome = terminal_outcome;
        for example in self.examples.iter_mut().rev() {
            outcome = -outcome;
            example.outcome = outcome;
        }
        self.examples
    }
}
