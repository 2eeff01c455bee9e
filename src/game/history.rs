//! Board history as a ring of inverse edits.
//!
//! Instead of storing the last `H−1` full positions, the game stores the
//! edits that undo each move: applying the newest diff to the current
//! board yields the previous board, chaining reaches further back. Slots
//! that have never been written hold a sentinel (no-op) diff, so
//! reconstructing history past the start of the game yields empty boards
//! automatically.

use im::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Color;

/// Inverse edit reconstructing the previous board from the next one.
///
/// `add` holds the stones to put back (captures undone), `rem` the single
/// stone to take away (the move just played, when it survived).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoardDiff {
    /// Stones to restore, with their colors.
    pub add: SmallVec<[(usize, Color); 4]>,

    /// Stone to remove, if the move left one on the board.
    pub rem: Option<usize>,
}

impl BoardDiff {
    /// The no-op sentinel diff.
    #[must_use]
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Apply this diff to a board in place.
    pub fn apply(&self, board: &mut HashMap<usize, Color>) {
        for &(pos, color) in &self.add {
            board.insert(pos, color);
        }
        if let Some(rem) = self.rem {
            board.remove(&rem);
        }
    }

    /// True for the sentinel (applying it changes nothing).
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.add.is_empty() && self.rem.is_none()
    }
}

/// Fixed-capacity ring of board diffs, newest overwriting oldest.
///
/// The write head and logical count are explicit; capacity is `H−1` and
/// never changes after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffRing {
    slots: Vec<BoardDiff>,
    head: usize,
    count: usize,
}

impl DiffRing {
    /// Create a ring of the given capacity, seeded with sentinel diffs.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![BoardDiff::sentinel(); capacity],
            head: 0,
            count: 0,
        }
    }

    /// Ring capacity (`H−1`).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of diffs actually written, clamped to capacity.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// True before the first push.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Push a diff, overwriting the oldest slot when full.
    pub fn push(&mut self, diff: BoardDiff) {
        if self.slots.is_empty() {
            return;
        }
        self.slots[self.head] = diff;
        self.head = (self.head + 1) % self.slots.len();
        self.count = (self.count + 1).min(self.slots.len());
    }

    /// Iterate over all `capacity()` slots, newest first.
    ///
    /// Unwritten slots yield the sentinel, which keeps out-of-range
    /// history reconstruction a no-op.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &BoardDiff> {
        let capacity = self.slots.len();
        (0..capacity).map(move |k| &self.slots[(self.head + capacity - 1 - k) % capacity])
    }
}
