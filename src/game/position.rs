//! The Go position: board, captures, legal actions, scoring.

use im::HashMap;
use log::debug;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::core::{Color, GoRules};

use super::history::{BoardDiff, DiffRing};
use super::observation::Observation;

/// Neighbour list of an intersection; at most four entries.
type Neighbours = SmallVec<[usize; 4]>;

/// A Go position with bounded history.
///
/// The board is a persistent map from intersection index to stone color;
/// an absent key is an empty intersection. Cloning shares structure, so a
/// search tree node can own its position cheaply.
///
/// The cached favourable legal actions are the empty intersections that
/// are neither suicidal nor single-point eyes of the side to move, in
/// ascending order, followed by the pass action. An empty cache means the
/// game is finished (two consecutive passes).
#[derive(Clone, Debug)]
pub struct Game {
    rules: GoRules,
    board: HashMap<usize, Color>,
    differences: DiffRing,
    current_color: Color,
    favourable_legal_actions: Vec<usize>,
    last_pass: bool,
}

impl Game {
    /// An empty board with black to move.
    ///
    /// Every intersection plus pass is favourable, and the history ring is
    /// seeded with sentinels so the first observations see empty history.
    #[must_use]
    pub fn new(rules: GoRules) -> Self {
        let mut favourable_legal_actions = Vec::with_capacity(rules.num_actions());
        favourable_legal_actions.extend(0..=rules.board_length());

        Self {
            rules,
            board: HashMap::new(),
            differences: DiffRing::new(rules.history_size.saturating_sub(1)),
            current_color: Color::Black,
            favourable_legal_actions,
            last_pass: false,
        }
    }

    /// The rules this game is played under.
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &GoRules {
        &self.rules
    }

    /// The side to move.
    #[inline]
    #[must_use]
    pub fn color(&self) -> Color {
        self.current_color
    }

    /// Read-only view of the favourable legal actions.
    #[inline]
    #[must_use]
    pub fn favourable_legal_actions(&self) -> &[usize] {
        &self.favourable_legal_actions
    }

    /// True when no favourable legal action remains (pass-pass).
    #[inline]
    #[must_use]
    pub fn finished(&self) -> bool {
        self.favourable_legal_actions.is_empty()
    }

    /// Stone at an intersection, if any.
    #[inline]
    #[must_use]
    pub fn stone_at(&self, pos: usize) -> Option<Color> {
        self.board.get(&pos).copied()
    }

    /// Number of stones on the board.
    #[must_use]
    pub fn stone_count(&self) -> usize {
        self.board.len()
    }

    /// Play an action: an intersection index or the pass index.
    ///
    /// Panics if the action is not in the favourable legal actions; that
    /// indicates a driver bug, not a recoverable condition.
    pub fn step(&mut self, action: usize) {
        assert!(
            self.favourable_legal_actions.binary_search(&action).is_ok(),
            "step({}) is not a favourable legal action for {}",
            action,
            self.current_color
        );

        let mut diff = BoardDiff::sentinel();
        let pass = self.rules.pass();

        if action != pass {
            let mover = self.current_color;
            let opponent = mover.opponent();
            self.board.insert(action, mover);

            // capture adjacent opponent chains left without liberties
            for neigh in self.adjacent(action) {
                if self.board.get(&neigh) == Some(&opponent) {
                    for captured in self.captured_stones(neigh) {
                        diff.add.push((captured, opponent));
                        self.board.remove(&captured);
                    }
                }
            }

            // suicide resolution: the mover's own chain goes last
            for captured in self.captured_stones(action) {
                if captured != action {
                    diff.add.push((captured, mover));
                }
                self.board.remove(&captured);
            }

            if self.board.get(&action) == Some(&mover) {
                diff.rem = Some(action);
            }
        }

        self.differences.push(diff);
        self.current_color = self.current_color.opponent();

        self.favourable_legal_actions.clear();
        if !(action == pass && self.last_pass) {
            self.update_legal_actions();
        }

        self.last_pass = action == pass;
    }

    /// Signed area score for the side to move.
    ///
    /// Stones plus exclusive territory, komi added to white, positive when
    /// the side to move is ahead.
    #[must_use]
    pub fn score(&self) -> f32 {
        let mut black_score = 0.0f32;
        let mut white_score = 0.0f32;
        for color in self.board.values() {
            match color {
                Color::Black => black_score += 1.0,
                Color::White => white_score += 1.0,
            }
        }

        // flood-fill each empty region; it scores for a color iff it
        // touches stones of only that color
        let mut unknown: FxHashSet<usize> = (0..self.rules.board_length())
            .filter(|pos| !self.board.contains_key(pos))
            .collect();

        while let Some(&start) = unknown.iter().next() {
            let mut frontier = vec![start];
            unknown.remove(&start);
            let mut touches_black = false;
            let mut touches_white = false;
            let mut count = 0u32;

            while let Some(pos) = frontier.pop() {
                count += 1;
                for neigh in self.adjacent(pos) {
                    match self.board.get(&neigh) {
                        None => {
                            if unknown.remove(&neigh) {
                                frontier.push(neigh);
                            }
                        }
                        Some(Color::Black) => touches_black = true,
                        Some(Color::White) => touches_white = true,
                    }
                }
            }

            if touches_black && !touches_white {
                black_score += count as f32;
            } else if touches_white && !touches_black {
                white_score += count as f32;
            }
        }

        white_score += self.rules.komi;
        debug!(
            "score: black {:.1}, white {:.1} (komi {:.1})",
            black_score, white_score, self.rules.komi
        );

        match self.current_color {
            Color::Black => black_score - white_score,
            Color::White => white_score - black_score,
        }
    }

    /// Signed outcome for the side to move: +1 win, −1 loss.
    ///
    /// Panics on a drawn score; fractional komi makes a draw unreachable
    /// in the reference configuration.
    #[must_use]
    pub fn outcome(&self) -> f32 {
        let score = self.score();
        if score > 0.0 {
            1.0
        } else if score < 0.0 {
            -1.0
        } else {
            panic!("outcome is a draw");
        }
    }

    /// Encode the observation tensor for the side to move.
    pub fn observation(&self) -> Observation {
        // reconstruct the remembered positions by chaining inverse diffs,
        // newest first
        let history = self.rules.history_size;
        let mut boards: Vec<HashMap<usize, Color>> = Vec::with_capacity(history);
        boards.push(self.board.clone());
        for diff in self.differences.iter_newest_first() {
            let mut previous = boards[boards.len() - 1].clone();
            diff.apply(&mut previous);
            boards.push(previous);
        }

        let size = self.rules.boardsize;
        let channels = self.rules.num_channels();
        let mut observation = Observation::zeros([size, size, channels]);

        let mover = self.current_color;
        for height in 0..size {
            for width in 0..size {
                let action = height * size + width;
                for (t, board) in boards.iter().enumerate() {
                    match board.get(&action) {
                        Some(c) if *c == mover => *observation.at_mut(height, width, 2 * t) = 1.0,
                        Some(_) => *observation.at_mut(height, width, 2 * t + 1) = 1.0,
                        None => {}
                    }
                }
                if mover == Color::White {
                    *observation.at_mut(height, width, channels - 1) = 1.0;
                }
            }
        }
        observation
    }

    /// Orthogonal neighbours of an intersection.
    fn adjacent(&self, pos: usize) -> Neighbours {
        let size = self.rules.boardsize;
        let mut neighbours = Neighbours::new();
        if pos >= size {
            neighbours.push(pos - size);
        }
        if pos + size < size * size {
            neighbours.push(pos + size);
        }
        if pos % size > 0 {
            neighbours.push(pos - 1);
        }
        if pos % size < size - 1 {
            neighbours.push(pos + 1);
        }
        neighbours
    }

    /// The chain containing `start` if it has no liberties, else empty.
    fn captured_stones(&self, start: usize) -> FxHashSet<usize> {
        let color = match self.board.get(&start) {
            Some(c) => *c,
            None => return FxHashSet::default(),
        };

        let mut chain = FxHashSet::default();
        chain.insert(start);
        let mut frontier = vec![start];

        while let Some(pos) = frontier.pop() {
            for neigh in self.adjacent(pos) {
                match self.board.get(&neigh) {
                    // a liberty saves the whole chain
                    None => return FxHashSet::default(),
                    Some(c) if *c == color => {
                        if chain.insert(neigh) {
                            frontier.push(neigh);
                        }
                    }
                    _ => {}
                }
            }
        }
        chain
    }

    /// True when every target stone is in `start`'s chain.
    fn reachable(&self, start: usize, targets: &[usize]) -> bool {
        let color = match self.board.get(&start) {
            Some(c) => *c,
            None => return false,
        };

        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut frontier = vec![start];
        let mut reached = 0;

        while let Some(pos) = frontier.pop() {
            for neigh in self.adjacent(pos) {
                if self.board.get(&neigh) == Some(&color) && seen.insert(neigh) {
                    if targets.contains(&neigh) {
                        reached += 1;
                        if reached == targets.len() {
                            return true;
                        }
                    }
                    frontier.push(neigh);
                }
            }
        }
        targets.is_empty()
    }

    /// Recompute the favourable legal actions for the side to move.
    fn update_legal_actions(&mut self) {
        let mover = self.current_color;
        let opponent = mover.opponent();

        'board: for action in 0..self.rules.board_length() {
            if self.board.contains_key(&action) {
                continue;
            }

            let neighbours = self.adjacent(action);

            // an empty neighbour means the move keeps a liberty and the
            // intersection cannot be an eye
            for &neigh in &neighbours {
                if !self.board.contains_key(&neigh) {
                    self.favourable_legal_actions.push(action);
                    continue 'board;
                }
            }

            // suicide filter: place the stone and look for captures
            self.board.insert(action, mover);
            for &neigh in &neighbours {
                if self.board.get(&neigh) == Some(&opponent)
                    && !self.captured_stones(neigh).is_empty()
                {
                    self.board.remove(&action);
                    self.favourable_legal_actions.push(action);
                    continue 'board;
                }
            }
            let own_captured = self.captured_stones(action);
            self.board.remove(&action);
            if !own_captured.is_empty() {
                continue 'board;
            }

            // eye filter: all neighbours ours, all in one chain
            for &neigh in &neighbours {
                if self.board.get(&neigh) != Some(&mover) {
                    self.favourable_legal_actions.push(action);
                    continue 'board;
                }
            }
            if self.reachable(neighbours[0], &neighbours[1..]) {
                continue 'board;
            }

            self.favourable_legal_actions.push(action);
        }

        self.favourable_legal_actions.push(self.rules.pass());
    }

    fn board_string(&self, board: &HashMap<usize, Color>) -> String {
        let size = self.rules.boardsize;
        let mut out = String::with_capacity(size * (2 * size + 1));
        for height in 0..size {
            for width in 0..size {
                let glyph = match board.get(&(height * size + width)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '-',
                };
                out.push(glyph);
                if width < size - 1 {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} to move", self.current_color)?;
        writeln!(f, "Current position:")?;
        write!(f, "{}", self.board_string(&self.board))?;

        let mut board = self.board.clone();
        for (i, diff) in self.differences.iter_newest_first().enumerate() {
            diff.apply(&mut board);
            writeln!(f, "Position {}:", i + 1)?;
            write!(f, "{}", self.board_string(&board))?;
        }
        Ok(())
    }
}
