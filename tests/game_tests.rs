//! Game engine integration tests: rules invariants and the literal
//! capture/suicide/termination scenarios.

use proptest::prelude::*;

use sente::core::{Color, GoRules};
use sente::game::Game;

fn rules(boardsize: usize) -> GoRules {
    GoRules {
        boardsize,
        komi: 5.5,
        history_size: 4,
    }
}

/// Board occupancy as a plain vector, for history comparisons.
fn snapshot(game: &Game) -> Vec<Option<Color>> {
    (0..game.rules().board_length())
        .map(|pos| game.stone_at(pos))
        .collect()
}

/// Orthogonal neighbours, re-derived independently of the engine.
fn neighbours(pos: usize, size: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(4);
    if pos >= size {
        out.push(pos - size);
    }
    if pos + size < size * size {
        out.push(pos + size);
    }
    if pos % size > 0 {
        out.push(pos - 1);
    }
    if pos % size < size - 1 {
        out.push(pos + 1);
    }
    out
}

/// Number of liberties of the chain containing `start`.
fn chain_liberties(game: &Game, start: usize) -> usize {
    let size = game.rules().boardsize;
    let color = game.stone_at(start).expect("liberties of an empty point");
    let mut chain = vec![start];
    let mut seen = vec![false; size * size];
    seen[start] = true;
    let mut liberties = std::collections::HashSet::new();

    while let Some(pos) = chain.pop() {
        for neigh in neighbours(pos, size) {
            match game.stone_at(neigh) {
                None => {
                    liberties.insert(neigh);
                }
                Some(c) if c == color && !seen[neigh] => {
                    seen[neigh] = true;
                    chain.push(neigh);
                }
                _ => {}
            }
        }
    }
    liberties.len()
}

/// Play a pseudo-random legal game, returning the final game and the
/// board snapshot after every move (index 0 = empty board).
fn random_game(rules: GoRules, choices: &[u32], skip_pass: bool) -> (Game, Vec<Vec<Option<Color>>>) {
    let mut game = Game::new(rules);
    let mut snapshots = vec![snapshot(&game)];

    for &choice in choices {
        if game.finished() {
            break;
        }
        let legal = game.favourable_legal_actions();
        // optionally avoid passing so games keep developing
        let limit = if skip_pass && legal.len() > 1 {
            legal.len() - 1
        } else {
            legal.len()
        };
        let action = legal[choice as usize % limit];
        game.step(action);
        snapshots.push(snapshot(&game));
    }
    (game, snapshots)
}

// =============================================================================
// Quantified invariants
// =============================================================================

proptest! {
    // Every remembered observation plane matches the board as it actually
    // was that many moves ago.
    #[test]
    fn history_round_trip(choices in proptest::collection::vec(0u32..1000, 1..25)) {
        let rules = rules(5);
        let (game, snapshots) = random_game(rules, &choices, true);

        let moves_played = snapshots.len() - 1;
        let observation = game.observation();
        let mover = game.color();

        for t in 0..rules.history_size {
            let expected: Vec<Option<Color>> = if t <= moves_played {
                snapshots[moves_played - t].clone()
            } else {
                vec![None; rules.board_length()]
            };

            for pos in 0..rules.board_length() {
                let (height, width) = (pos / rules.boardsize, pos % rules.boardsize);
                let want_mover = (expected[pos] == Some(mover)) as u8 as f32;
                let want_opponent = (expected[pos] == Some(mover.opponent())) as u8 as f32;
                prop_assert_eq!(observation.at(height, width, 2 * t), want_mover);
                prop_assert_eq!(observation.at(height, width, 2 * t + 1), want_opponent);
            }
        }
    }

    // No chain is ever left without a liberty after a step.
    #[test]
    fn captures_leave_no_dead_chains(choices in proptest::collection::vec(0u32..1000, 1..40)) {
        let rules = rules(5);
        let (game, _) = random_game(rules, &choices, true);

        for pos in 0..rules.board_length() {
            if game.stone_at(pos).is_some() {
                prop_assert!(chain_liberties(&game, pos) > 0, "dead chain at {}", pos);
            }
        }
    }

    // Every favourable non-pass action leaves the placed stone on the
    // board: suicide never makes the list.
    #[test]
    fn favourable_actions_are_not_suicide(choices in proptest::collection::vec(0u32..1000, 1..30)) {
        let rules = rules(5);
        let (game, _) = random_game(rules, &choices, true);
        prop_assume!(!game.finished());

        let mover = game.color();
        for &action in game.favourable_legal_actions() {
            if action == rules.pass() {
                continue;
            }
            let mut probe = game.clone();
            probe.step(action);
            prop_assert_eq!(probe.stone_at(action), Some(mover));
        }
    }

    // Two consecutive passes always end the game.
    #[test]
    fn pass_pass_terminates(choices in proptest::collection::vec(0u32..1000, 0..20)) {
        let rules = rules(5);
        let (mut game, _) = random_game(rules, &choices, true);
        prop_assume!(!game.finished());

        game.step(rules.pass());
        game.step(rules.pass());
        prop_assert!(game.finished());
        prop_assert!(game.favourable_legal_actions().is_empty());
    }

    // Mutating a clone never touches the original.
    #[test]
    fn deep_copy_independence(
        prefix in proptest::collection::vec(0u32..1000, 1..15),
        suffix in proptest::collection::vec(0u32..1000, 1..15),
    ) {
        let rules = rules(5);
        let (game, _) = random_game(rules, &prefix, true);

        let board_before = snapshot(&game);
        let legal_before = game.favourable_legal_actions().to_vec();
        let observation_before = game.observation();

        let mut copy = game.clone();
        for &choice in &suffix {
            if copy.finished() {
                break;
            }
            let legal = copy.favourable_legal_actions();
            let action = legal[choice as usize % legal.len()];
            copy.step(action);
        }

        prop_assert_eq!(snapshot(&game), board_before);
        prop_assert_eq!(game.favourable_legal_actions(), legal_before.as_slice());
        prop_assert_eq!(game.observation(), observation_before);
    }

    // An empty point fully enclosed by one friendly chain is never
    // offered as an action.
    #[test]
    fn eyes_are_filtered(choices in proptest::collection::vec(0u32..1000, 1..40)) {
        let rules = rules(5);
        let (game, _) = random_game(rules, &choices, true);
        prop_assume!(!game.finished());

        let mover = game.color();
        let size = rules.boardsize;
        for pos in 0..rules.board_length() {
            if game.stone_at(pos).is_some() {
                continue;
            }
            let around = neighbours(pos, size);
            if !around.iter().all(|&n| game.stone_at(n) == Some(mover)) {
                continue;
            }
            // single connected chain iff the chain of the first neighbour
            // contains them all
            let mut chain = vec![around[0]];
            let mut seen = vec![false; size * size];
            seen[around[0]] = true;
            while let Some(p) = chain.pop() {
                for n in neighbours(p, size) {
                    if game.stone_at(n) == Some(mover) && !seen[n] {
                        seen[n] = true;
                        chain.push(n);
                    }
                }
            }
            if around.iter().all(|&n| seen[n]) {
                prop_assert!(
                    !game.favourable_legal_actions().contains(&pos),
                    "eye at {} offered as an action",
                    pos
                );
            }
        }
    }
}

// =============================================================================
// Literal scenarios
// =============================================================================

// S1: a capture-free miniature game on 3x3, checking area scoring.
#[test]
fn test_minimal_game_scoring() {
    let rules = rules(3);
    let mut game = Game::new(rules);
    game.step(0); // B a1
    game.step(3); // W a2
    game.step(4); // B b2
    game.step(rules.pass()); // W
    game.step(rules.pass()); // B

    assert!(game.finished());
    assert_eq!(game.stone_at(0), Some(Color::Black));
    assert_eq!(game.stone_at(4), Some(Color::Black));
    assert_eq!(game.stone_at(3), Some(Color::White));

    // black 2 stones, white 1 + komi 5.5, open territory neutral;
    // white to move, so the score is from white's view
    assert_eq!(game.color(), Color::White);
    assert!((game.score() - 4.5).abs() < 1e-6);
    assert_eq!(game.outcome(), 1.0);
}

// S2: a point whose occupation would be self-capture is not offered.
#[test]
fn test_suicide_impossible() {
    let rules = rules(3);
    let mut game = Game::new(rules);
    game.step(8); // B c3
    game.step(3); // W a2
    game.step(7); // B b3
    game.step(1); // W b1

    assert_eq!(game.color(), Color::Black);
    assert!(
        !game.favourable_legal_actions().contains(&0),
        "a1 would be suicide for black"
    );
}

// S3: immediate pass-pass; komi decides for white and black is to move.
#[test]
fn test_opening_pass_pass_outcome() {
    let rules = rules(5);
    let mut game = Game::new(rules);
    game.step(rules.pass());
    game.step(rules.pass());

    assert!(game.finished());
    assert_eq!(game.color(), Color::Black);
    assert_eq!(game.outcome(), -1.0);
}

// S4: observation geometry of the opening position.
#[test]
fn test_opening_observation_shape() {
    let game = Game::new(rules(5));
    let observation = game.observation();

    assert_eq!(observation.shape, [5, 5, 9]);
    assert!(observation.tensor.iter().all(|&v| v == 0.0));
    assert_eq!(observation.len(), 225);
}
