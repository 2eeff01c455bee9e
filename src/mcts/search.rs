//! The PUCT search agent.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Sender;
use log::{debug, info};

use crate::agent::Agent;
use crate::core::{Color, EngineConfig, SearchRng};
use crate::game::{Game, Observation};
use crate::mcts::node::Node;
use crate::predict::Request;

/// The tree-search agent.
///
/// Holds the current root of the shared tree and drives batched parallel
/// searches against the predictor. The driver interacts through the
/// `Agent` trait: `reset`, then per move `search` followed by `explore`
/// or `exploit` and a `step` down to the chosen child.
pub struct SearchAgent {
    config: EngineConfig,
    predict_tx: Sender<Request>,
    root: Option<Arc<Node>>,

    /// 1 + simulations completed through the current root.
    root_count: AtomicU32,

    rng: SearchRng,
}

impl SearchAgent {
    /// Create an agent talking to the given predictor channel.
    ///
    /// The agent starts unset; call `reset()` before anything else.
    #[must_use]
    pub fn new(config: EngineConfig, predict_tx: Sender<Request>) -> Self {
        let rng = SearchRng::new(config.random_seed);
        Self {
            config,
            predict_tx,
            root: None,
            root_count: AtomicU32::new(0),
            rng,
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 1 + simulations completed through the current root.
    #[must_use]
    pub fn root_count(&self) -> u32 {
        self.root_count.load(Ordering::SeqCst)
    }

    /// The current root node.
    ///
    /// Panics when the agent has not been reset.
    #[must_use]
    pub fn root(&self) -> &Arc<Node> {
        self.root
            .as_ref()
            .expect("agent has no root; call reset() first")
    }
}

impl Agent for SearchAgent {
    fn name(&self) -> &'static str {
        "Tree search agent"
    }

    fn reset(&mut self) {
        debug!("resetting the game tree");
        let (root, _) = Node::build(Game::new(self.config.rules), &self.predict_tx);
        self.root = Some(root);
        self.root_count.store(1, Ordering::SeqCst);
    }

    fn search(&mut self) {
        let root = self
            .root
            .as_ref()
            .expect("cannot search from an unset root");
        assert!(!root.finished(), "cannot search from a finished root");

        let workers = self.config.predict_batch_size;
        let nsims = self.config.nsims_per_worker;
        let score_factor = self.config.policy_score_factor;
        let root_count = &self.root_count;
        let predict_tx = &self.predict_tx;

        let start = Instant::now();
        thread::scope(|scope| {
            for _ in 0..workers {
                let root = Arc::clone(root);
                let predict_tx = predict_tx.clone();
                scope.spawn(move || {
                    for _ in 0..nsims {
                        simulate_once(&root, root_count, &predict_tx, score_factor);
                    }
                });
            }
        });
        info!(
            "performed {} simulations in {:?}",
            workers * nsims,
            start.elapsed()
        );
    }

    fn exploit(&mut self) -> (usize, Vec<f32>) {
        let root = self.root();
        let counts = root.counts();

        let mut action_idx = 0;
        let mut max_count = 0;
        for (idx, &count) in counts.iter().enumerate() {
            if count > max_count {
                max_count = count;
                action_idx = idx;
            }
        }

        let mut policy = vec![0.0; self.config.rules.num_actions()];
        let action = root.game().favourable_legal_actions()[action_idx];
        policy[action] = 1.0;
        (action_idx, policy)
    }

    fn explore(&mut self) -> (usize, Vec<f32>) {
        let sum = self.root_count.load(Ordering::SeqCst) - 1;
        assert!(sum > 0, "cannot explore without prior simulations");

        let r = self.rng.gen_unit_open();
        let root = self.root();
        let counts = root.counts();
        let legal_actions = root.game().favourable_legal_actions();

        // normalize the visit counts into the policy and sample from it
        // in one pass: the first action whose cumulative mass reaches r
        let mut policy = vec![0.0; self.config.rules.num_actions()];
        let mut chosen = None;
        let mut accumulated = 0.0f32;
        for (idx, (&action, &count)) in legal_actions.iter().zip(counts.iter()).enumerate() {
            let p = count as f32 / sum as f32;
            policy[action] = p;
            if chosen.is_none() {
                accumulated += p;
                if accumulated >= r {
                    chosen = Some(idx);
                }
            }
        }

        // float residue can leave the total mass a hair under r
        let action_idx = chosen.unwrap_or(legal_actions.len() - 1);
        debug!(
            "explore chose action index {} out of {} legal actions",
            action_idx,
            legal_actions.len()
        );
        (action_idx, policy)
    }

    fn step(&mut self, action_idx: usize) {
        let root = self
            .root
            .take()
            .expect("cannot step from an unset root");
        debug!(
            "taking move {}",
            root.game().favourable_legal_actions()[action_idx]
        );

        let child = match root.child(action_idx) {
            Some(child) => child,
            None => {
                // the search never visited this edge; expand it now
                let (candidate, _) = root.build_child(action_idx, &self.predict_tx);
                root.install_child(action_idx, candidate)
            }
        };

        // rebase the visit counter: 1 + simulations already propagated
        // through the new root while it was a child
        let visits: u32 = child.counts().iter().sum();
        self.root_count.store(1 + visits, Ordering::SeqCst);

        // dropping the old root releases the unselected siblings
        self.root = Some(child);
    }

    fn observation(&self) -> Observation {
        self.root().game().observation()
    }

    fn outcome(&self) -> f32 {
        self.root().game().outcome()
    }

    fn finished(&self) -> bool {
        self.root().finished()
    }

    fn color(&self) -> Color {
        self.root().game().color()
    }

    fn favourable_legal_actions(&self) -> &[usize] {
        self.root().game().favourable_legal_actions()
    }
}

/// One simulation: select to a leaf, expand through the predictor,
/// back-propagate with alternating sign.
fn simulate_once(
    root: &Arc<Node>,
    root_count: &AtomicU32,
    predict_tx: &Sender<Request>,
    score_factor: f32,
) {
    let mut path: Vec<(Arc<Node>, usize)> = Vec::new();
    let mut current = Arc::clone(root);
    let mut parent_count = root_count.load(Ordering::SeqCst);

    let mut value;
    loop {
        let (action_idx, edge_count) = current.select(parent_count, score_factor);
        path.push((Arc::clone(&current), action_idx));

        match current.child(action_idx) {
            Some(child) if !child.finished() => {
                parent_count = edge_count;
                current = child;
            }
            Some(child) => {
                value = child.game().outcome();
                break;
            }
            None => {
                let (candidate, v) = current.build_child(action_idx, predict_tx);
                current.install_child(action_idx, candidate);
                value = v;
                break;
            }
        }
    }

    // values alternate sign per ply: the game strictly alternates colors
    for (node, action_idx) in path.iter().rev() {
        value = -value;
        node.update(*action_idx, value);
    }
    root_count.fetch_add(1, Ordering::SeqCst);
}
