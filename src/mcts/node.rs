//! Shared tree nodes and their per-edge statistics.

use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use log::debug;

use crate::game::Game;
use crate::predict::{request_prediction, Request};

/// Per-edge search statistics, one entry per favourable legal action.
///
/// Guarded together so the running-mean update of `values` is consistent
/// with `counts`, and so child installation is atomic with respect to
/// concurrent selections.
#[derive(Debug)]
struct NodeStats {
    /// Mean action value Q, from this node's mover's perspective.
    values: Vec<f32>,

    /// Visit count N.
    counts: Vec<u32>,

    /// Outstanding virtual loss L.
    virtual_losses: Vec<f32>,

    /// Child slots; `None` until a simulation expands the edge.
    children: Vec<Option<Arc<Node>>>,
}

/// One node of the shared search tree.
///
/// A node owns its position and its prior vector; everything mutable sits
/// behind the stats mutex. A terminal node has no edges at all.
#[derive(Debug)]
pub struct Node {
    game: Game,
    priors: Vec<f32>,
    stats: Mutex<NodeStats>,
}

/// One unit of virtual loss.
const VIRTUAL_LOSS_UNIT: f32 = 1.0;

impl Node {
    /// Construct a node for a position, evaluating it when non-terminal.
    ///
    /// Returns the node together with the value to back-propagate: the
    /// network value for a non-terminal position, the game outcome for a
    /// terminal one. Both are from the perspective of the node's side to
    /// move.
    pub fn build(game: Game, predict_tx: &Sender<Request>) -> (Arc<Self>, f32) {
        let arity = game.favourable_legal_actions().len();

        let (priors, value) = if arity == 0 {
            (Vec::new(), game.outcome())
        } else {
            let response = request_prediction(predict_tx, game.observation());
            let priors = legal_softmax(&response.policy, game.favourable_legal_actions());
            (priors, response.value)
        };

        debug!(
            "constructed node for {} with {} actions, value {:.4}",
            game.color(),
            arity,
            value
        );

        let node = Arc::new(Self {
            game,
            priors,
            stats: Mutex::new(NodeStats {
                values: vec![0.0; arity],
                counts: vec![0; arity],
                virtual_losses: vec![0.0; arity],
                children: vec![None; arity],
            }),
        });
        (node, value)
    }

    /// Construct the child reached by the `action_idx`-th legal action.
    pub fn build_child(&self, action_idx: usize, predict_tx: &Sender<Request>) -> (Arc<Self>, f32) {
        let mut game = self.game.clone();
        let action = self.game.favourable_legal_actions()[action_idx];
        game.step(action);
        Self::build(game, predict_tx)
    }

    /// The position this node represents.
    #[inline]
    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Number of favourable legal actions (edges).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.priors.len()
    }

    /// True when the position has no favourable legal actions.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.game.finished()
    }

    /// Prior probabilities over the favourable legal actions.
    #[must_use]
    pub fn priors(&self) -> &[f32] {
        &self.priors
    }

    /// Select an action by PUCT score and place a virtual loss on it.
    ///
    /// `parent_count` is the visit total of the edge (or root counter)
    /// that led here. Returns the selected index and the edge's visit
    /// count prior to this simulation. Ties break toward the lowest
    /// index.
    pub fn select(&self, parent_count: u32, score_factor: f32) -> (usize, u32) {
        let mut stats = self.stats.lock().expect("node stats poisoned");
        debug_assert!(!stats.values.is_empty(), "selecting on a terminal node");

        let sqrt_parent = (parent_count as f32).sqrt();
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;
        for idx in 0..stats.values.len() {
            let score = stats.values[idx] - stats.virtual_losses[idx]
                + score_factor * self.priors[idx] * sqrt_parent
                    / (1.0 + stats.counts[idx] as f32);
            if score > best_score {
                best_idx = idx;
                best_score = score;
            }
        }

        stats.virtual_losses[best_idx] += VIRTUAL_LOSS_UNIT;
        (best_idx, stats.counts[best_idx])
    }

    /// Back-propagate a value through an edge: lift the virtual loss,
    /// count the visit and fold the value into the running mean.
    pub fn update(&self, action_idx: usize, value: f32) {
        let mut stats = self.stats.lock().expect("node stats poisoned");
        stats.virtual_losses[action_idx] -= VIRTUAL_LOSS_UNIT;
        stats.counts[action_idx] += 1;
        let count = stats.counts[action_idx] as f32;
        stats.values[action_idx] += (value - stats.values[action_idx]) / count;
    }

    /// The child at an edge, if the edge has been expanded.
    #[must_use]
    pub fn child(&self, action_idx: usize) -> Option<Arc<Node>> {
        let stats = self.stats.lock().expect("node stats poisoned");
        stats.children[action_idx].clone()
    }

    /// Install a candidate child unless the slot was filled meanwhile.
    ///
    /// Returns the node that ended up in the slot; the losing candidate
    /// of an install race is dropped (the positions are identical).
    pub fn install_child(&self, action_idx: usize, candidate: Arc<Node>) -> Arc<Node> {
        let mut stats = self.stats.lock().expect("node stats poisoned");
        match &stats.children[action_idx] {
            Some(existing) => Arc::clone(existing),
            None => {
                stats.children[action_idx] = Some(Arc::clone(&candidate));
                candidate
            }
        }
    }

    /// Snapshot of the visit counts.
    #[must_use]
    pub fn counts(&self) -> Vec<u32> {
        self.stats.lock().expect("node stats poisoned").counts.clone()
    }

    /// Snapshot of the mean action values.
    #[must_use]
    pub fn values(&self) -> Vec<f32> {
        self.stats.lock().expect("node stats poisoned").values.clone()
    }

    /// Snapshot of the outstanding virtual losses.
    #[must_use]
    pub fn virtual_losses(&self) -> Vec<f32> {
        self.stats
            .lock()
            .expect("node stats poisoned")
            .virtual_losses
            .clone()
    }
}

/// Softmax of the logits restricted to the favourable legal actions.
fn legal_softmax(logits: &[f32], legal_actions: &[usize]) -> Vec<f32> {
    let max = legal_actions
        .iter()
        .map(|&action| logits[action])
        .fold(f32::NEG_INFINITY, f32::max);

    let mut priors: Vec<f32> = legal_actions
        .iter()
        .map(|&action| (logits[action] - max).exp())
        .collect();
    let sum: f32 = priors.iter().sum();
    for prior in &mut priors {
        *prior /= sum;
    }
    priors
}
