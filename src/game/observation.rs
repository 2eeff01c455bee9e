//! Observation tensors for the neural evaluator.

use serde::{Deserialize, Serialize};

/// A rank-3 observation tensor in flat row-major layout.
///
/// Shape is `(boardsize, boardsize, 2·history_size + 1)`. For each
/// remembered position `t` (0 = current), channel `2t` marks the stones
/// of the side to move and channel `2t+1` the opponent's; the final
/// channel is all ones when white is to move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Flattened tensor data, row-major `(height, width, channel)`.
    pub tensor: Vec<f32>,

    /// Tensor shape.
    pub shape: [usize; 3],
}

impl Observation {
    /// Create an observation from flat data and its shape.
    pub fn new(tensor: Vec<f32>, shape: [usize; 3]) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Create a zero-filled observation with the given shape.
    #[must_use]
    pub fn zeros(shape: [usize; 3]) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// True when the tensor has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Element at `(height, width, channel)`.
    #[inline]
    #[must_use]
    pub fn at(&self, height: usize, width: usize, channel: usize) -> f32 {
        let [_, w, c] = self.shape;
        self.tensor[(height * w + width) * c + channel]
    }

    /// Mutable element at `(height, width, channel)`.
    #[inline]
    pub fn at_mut(&mut self, height: usize, width: usize, channel: usize) -> &mut f32 {
        let [_, w, c] = self.shape;
        &mut self.tensor[(height * w + width) * c + channel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_shape() {
        let obs = Observation::zeros([5, 5, 9]);
        assert_eq!(obs.len(), 225);
        assert!(obs.tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_indexing_row_major() {
        let mut obs = Observation::zeros([3, 3, 2]);
        *obs.at_mut(1, 2, 1) = 1.0;

        assert_eq!(obs.at(1, 2, 1), 1.0);
        // (h*w + w)*c + c = (1*3 + 2)*2 + 1
        assert_eq!(obs.tensor[11], 1.0);
    }

    #[test]
    fn test_serialization() {
        let obs = Observation::new(vec![0.0, 1.0, 0.0, 1.0], [2, 2, 1]);
        let json = serde_json::to_string(&obs).unwrap();
        let deserialized: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, deserialized);
    }
}
