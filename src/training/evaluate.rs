//! Evaluation games against the random baseline.

use std::time::Instant;

use log::info;

use crate::agent::Agent;
use crate::core::{Color, SearchRng};
use crate::record::GameRecord;

/// Play one game with the agent steering only its own color.
///
/// The off-color moves are sampled uniformly from the agent's favourable
/// legal actions, so a single tree serves both sides. Returns the game
/// record with the agent and baseline names placed by color.
pub fn evaluation_game(
    agent: &mut dyn Agent,
    agent_color: Color,
    rng: &mut SearchRng,
) -> GameRecord {
    let start = Instant::now();
    agent.reset();

    let (black_name, white_name) = match agent_color {
        Color::Black => (agent.name().to_string(), "Random player".to_string()),
        Color::White => ("Random player".to_string(), agent.name().to_string()),
    };
    let mut record = GameRecord::new(agent.color(), black_name, white_name);

    let mut game_length = 0;
    while !agent.finished() {
        let action_idx = if agent.color() == agent_color {
            agent.search();
            agent.exploit().0
        } else {
            rng.gen_range_usize(0..agent.favourable_legal_actions().len())
        };
        record.actions.push(agent.favourable_legal_actions()[action_idx]);
        agent.step(action_idx);
        game_length += 1;
    }

    let outcome = agent.outcome();
    record.outcome = outcome;
    info!(
        "evaluation game of length {} with the agent as {} finished {:+.0} in {:?}",
        game_length,
        agent_color,
        outcome,
        start.elapsed()
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use crate::core::EngineConfig;

    #[test]
    fn test_evaluation_game_produces_record() {
        let config = EngineConfig::default().with_random_seed(21);
        let mut agent = RandomAgent::new(config);
        let mut rng = SearchRng::new(99);

        let record = evaluation_game(&mut agent, Color::Black, &mut rng);

        assert_eq!(record.black_name, "Random player");
        assert!(!record.actions.is_empty());
        assert!(record.outcome == 1.0 || record.outcome == -1.0);
    }
}
