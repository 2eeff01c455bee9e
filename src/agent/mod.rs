//! The game-playing agent façade.
//!
//! Drivers (self-play, evaluation) talk to every player through this one
//! trait: reset, search, pick an action, step. The action returned by
//! `exploit`/`explore` is an index into the agent's current favourable
//! legal actions, and the accompanying policy vector spans the full
//! action space.

pub mod random;

pub use random::RandomAgent;

use crate::core::Color;
use crate::game::Observation;

/// A game-playing agent.
///
/// Lifecycle: `reset` roots the agent at an empty position; per move the
/// driver calls `search`, then `exploit` or `explore`, then `step` with
/// the chosen action index. `outcome` may only be called once `finished`
/// is true, and `explore` only after at least one `search`.
pub trait Agent {
    /// Display name, used in game records.
    fn name(&self) -> &'static str;

    /// Start a fresh game.
    fn reset(&mut self);

    /// Run the agent's deliberation for the current position.
    fn search(&mut self);

    /// Greedy action choice.
    ///
    /// Returns the index of the chosen favourable legal action and the
    /// policy over the full action space.
    fn exploit(&mut self) -> (usize, Vec<f32>);

    /// Stochastic action choice for early-game exploration.
    fn explore(&mut self) -> (usize, Vec<f32>);

    /// Advance to the position reached by the chosen action.
    fn step(&mut self, action_idx: usize);

    /// Observation tensor of the current position.
    fn observation(&self) -> Observation;

    /// Signed outcome of the finished game for the side to move.
    fn outcome(&self) -> f32;

    /// True when the game has ended.
    fn finished(&self) -> bool;

    /// Side to move.
    fn color(&self) -> Color;

    /// Favourable legal actions at the current position.
    fn favourable_legal_actions(&self) -> &[usize];
}
