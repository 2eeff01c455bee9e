//! Go position engine.
//!
//! Maintains a legal position with bounded history, enumerates the
//! favourable legal actions the search is allowed to consider (legal,
//! non-suicidal, not filling one's own single-point eyes), resolves
//! captures, scores finished games by area, and encodes the observation
//! tensor consumed by the neural evaluator.
//!
//! Positional superko is deliberately not enforced; the self-play driver
//! caps game length instead.

pub mod history;
pub mod observation;
pub mod position;

pub use history::{BoardDiff, DiffRing};
pub use observation::Observation;
pub use position::Game;
