//! SGF game records.
//!
//! A finished game becomes a Smart Game Format (FF[4]) document: one
//! header with the rules and player names, then the move list. The
//! record keeps actions as engine indices; encoding to SGF coordinates
//! happens at render time.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use crossbeam_channel::Receiver;
use log::{error, info};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Color, GoRules};

/// A finished game, ready to be rendered as SGF.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
    /// Color of the first mover.
    pub initial_color: Color,

    /// Black player's display name.
    pub black_name: String,

    /// White player's display name.
    pub white_name: String,

    /// Actions in play order (intersection indices, pass = boardsize²).
    pub actions: Vec<usize>,

    /// Signed outcome from the perspective of the player who would move
    /// next if the game were to continue.
    pub outcome: f32,
}

impl GameRecord {
    /// Start a record for a game opened by `initial_color`.
    #[must_use]
    pub fn new(initial_color: Color, black_name: String, white_name: String) -> Self {
        Self {
            initial_color,
            black_name,
            white_name,
            actions: Vec::new(),
            outcome: 0.0,
        }
    }

    /// The color that won the game.
    ///
    /// The stored outcome is relative to the side that would move next,
    /// so the winner follows from the parity of the move count.
    #[must_use]
    pub fn winner(&self) -> Color {
        let parity = self.actions.len() % 2;
        if (parity == 0 && self.outcome == 1.0) || (parity == 1 && self.outcome == -1.0) {
            self.initial_color
        } else {
            self.initial_color.opponent()
        }
    }

    /// Render the record as an SGF document.
    #[must_use]
    pub fn to_sgf(&self, rules: &GoRules) -> String {
        let mut sgf = String::with_capacity(128 + 6 * self.actions.len());
        sgf.push_str("(;");
        sgf.push_str("GM[1]");
        sgf.push_str("FF[4]");
        sgf.push_str("CA[UTF-8]");
        sgf.push_str("AP[sente:0.1.0]");
        sgf.push_str(&format!("KM[{:.1}]", rules.komi));
        sgf.push_str(&format!("SZ[{}]", rules.boardsize));
        sgf.push_str(&format!("DT[{}]", Local::now().format("%Y-%m-%d")));
        sgf.push_str(&format!("PB[{}]", self.black_name));
        sgf.push_str(&format!("PW[{}]", self.white_name));
        sgf.push_str(&format!("RE[{}]", self.winner().sgf_letter()));

        let mut color = self.initial_color;
        for &action in &self.actions {
            sgf.push(';');
            sgf.push(color.sgf_letter());
            sgf.push('[');
            if action != rules.pass() {
                let (width_char, height_char) = sgf_coordinates(action, rules.boardsize);
                sgf.push(width_char);
                sgf.push(height_char);
            }
            sgf.push(']');
            color = color.opponent();
        }
        sgf.push(')');
        sgf
    }
}

/// SGF coordinates of an intersection: `aa` is the top-left corner.
fn sgf_coordinates(action: usize, boardsize: usize) -> (char, char) {
    let height = (action / boardsize) as u8;
    let width = (action % boardsize) as u8;
    ((b'a' + width) as char, (b'a' + height) as char)
}

/// Consume finished games from a channel and write one `.sgf` file each.
///
/// Runs until the sending side disconnects. Files are uuid-named under
/// `record_prefix`.
pub fn save_records(
    records_rx: &Receiver<GameRecord>,
    rules: &GoRules,
    record_prefix: &str,
) -> std::io::Result<()> {
    fs::create_dir_all(record_prefix)?;
    for record in records_rx.iter() {
        let path = Path::new(record_prefix).join(format!("{}.sgf", Uuid::new_v4()));
        let mut file = match fs::File::create(&path) {
            Ok(file) => file,
            Err(err) => {
                error!("could not create game record file {:?}: {}", path, err);
                return Err(err);
            }
        };
        file.write_all(record.to_sgf(rules).as_bytes())?;
        info!("saved game record {:?}", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(actions: Vec<usize>, outcome: f32) -> GameRecord {
        GameRecord {
            initial_color: Color::Black,
            black_name: "Tree search agent".to_string(),
            white_name: "Random player".to_string(),
            actions,
            outcome,
        }
    }

    #[test]
    fn test_sgf_coordinates() {
        assert_eq!(sgf_coordinates(0, 5), ('a', 'a'));
        assert_eq!(sgf_coordinates(7, 5), ('c', 'b'));
        assert_eq!(sgf_coordinates(24, 5), ('e', 'e'));
    }

    #[test]
    fn test_winner_parity() {
        // even number of moves: outcome is from the initial color's view
        assert_eq!(record_with(vec![25, 25], -1.0).winner(), Color::White);
        assert_eq!(record_with(vec![0, 25, 25], 1.0).winner(), Color::White);
        assert_eq!(record_with(vec![0, 25, 25], -1.0).winner(), Color::Black);
    }

    #[test]
    fn test_sgf_header_and_moves() {
        let rules = GoRules::default();
        let record = record_with(vec![12, 25], -1.0);
        let sgf = record.to_sgf(&rules);

        assert!(sgf.starts_with("(;GM[1]FF[4]CA[UTF-8]"));
        assert!(sgf.contains("KM[5.5]"));
        assert!(sgf.contains("SZ[5]"));
        assert!(sgf.contains("PB[Tree search agent]"));
        assert!(sgf.contains("PW[Random player]"));
        assert!(sgf.contains("RE[W]"));
        assert!(sgf.contains(";B[cc]"));
        assert!(sgf.contains(";W[]"), "pass encodes as an empty pair");
        assert!(sgf.ends_with(')'));
    }
}
