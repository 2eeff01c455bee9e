//! The evaluator interface between the search and the model backend.

use crate::game::Observation;

/// Maps a batch of observations to per-sample policy logits and values.
///
/// Implementors wrap the actual model backend; loading the model happens
/// at construction time and a load failure is fatal there. `evaluate`
/// itself has no error path: a failing backend indicates a programming or
/// configuration fault and must panic.
pub trait Evaluator: Send {
    /// Evaluate a batch.
    ///
    /// Returns one logit vector of length `num_actions` and one value in
    /// `[-1, 1]` (from the perspective of the side to move in the sample)
    /// per observation, in batch order.
    fn evaluate(&self, batch: &[Observation]) -> (Vec<Vec<f32>>, Vec<f32>);
}

/// Baseline evaluator: constant logits and a fixed value.
///
/// Constant logits softmax to a uniform prior over the legal actions,
/// which makes search behaviour easy to reason about in tests.
#[derive(Clone, Debug)]
pub struct UniformEvaluator {
    num_actions: usize,
    value: f32,
}

impl UniformEvaluator {
    /// Create a uniform evaluator with value 0.
    #[must_use]
    pub fn new(num_actions: usize) -> Self {
        Self {
            num_actions,
            value: 0.0,
        }
    }

    /// Create a uniform evaluator returning a fixed value.
    #[must_use]
    pub fn with_value(num_actions: usize, value: f32) -> Self {
        Self { num_actions, value }
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, batch: &[Observation]) -> (Vec<Vec<f32>>, Vec<f32>) {
        let policies = batch.iter().map(|_| vec![0.0; self.num_actions]).collect();
        let values = vec![self.value; batch.len()];
        (policies, values)
    }
}
