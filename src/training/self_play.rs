//! The self-play loop and the experience file writer.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crossbeam_channel::Receiver;
use log::info;
use uuid::Uuid;

use crate::agent::Agent;
use crate::core::EngineConfig;
use crate::record::GameRecord;

use super::trajectory::{Example, Trajectory};

/// Plays complete self-play games with one agent taking both sides.
pub struct SelfPlayRunner {
    config: EngineConfig,
}

impl SelfPlayRunner {
    /// Create a runner for the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Play one game and return its examples (in game order, outcomes
    /// assigned) together with the game record.
    ///
    /// Per move: search, then explore while the move index is below
    /// `exploration_length` and exploit afterwards. The game ends on
    /// pass-pass or at `max_game_length`.
    pub fn play_game(&self, agent: &mut dyn Agent) -> (Vec<Example>, GameRecord) {
        let start = Instant::now();
        agent.reset();

        let mut record = GameRecord::new(
            agent.color(),
            agent.name().to_string(),
            agent.name().to_string(),
        );
        let mut trajectory = Trajectory::new();
        let mut game_length = 0;

        while !agent.finished() && game_length < self.config.max_game_length {
            agent.search();
            let (action_idx, policy) = if game_length < self.config.exploration_length {
                agent.explore()
            } else {
                agent.exploit()
            };
            game_length += 1;

            let action = agent.favourable_legal_actions()[action_idx];
            record.actions.push(action);
            info!("taking action {}", action);
            trajectory.push(agent.observation(), policy);
            agent.step(action_idx);
        }

        info!(
            "performed a self-play of length {} in {:?}",
            game_length,
            start.elapsed()
        );

        let outcome = agent.outcome();
        record.outcome = outcome;
        (trajectory.finalize(outcome), record)
    }
}

/// Consume examples from a channel and write them as line-delimited JSON.
///
/// Each file collects up to `num_examples_per_file` examples and gets a
/// fresh uuid name under `exp_prefix`. Runs until the sending side
/// disconnects; a final partial file is flushed on shutdown.
pub fn save_experience(
    experience_rx: &Receiver<Example>,
    num_examples_per_file: usize,
    exp_prefix: &str,
) -> std::io::Result<()> {
    fs::create_dir_all(exp_prefix)?;

    let mut open = true;
    while open {
        let mut lines = Vec::with_capacity(num_examples_per_file);
        for _ in 0..num_examples_per_file {
            match experience_rx.recv() {
                Ok(example) => {
                    let line = serde_json::to_string(&example)
                        .expect("could not encode an experience example");
                    lines.push(line);
                }
                Err(_) => {
                    open = false;
                    break;
                }
            }
        }
        if lines.is_empty() {
            continue;
        }

        let path = Path::new(exp_prefix).join(format!("{}.ex", Uuid::new_v4()));
        let mut file = fs::File::create(&path)?;
        for line in &lines {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
        }
        info!("saved {} examples to {:?}", lines.len(), path);
    }
    Ok(())
}
