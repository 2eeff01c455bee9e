//! Self-play driver: plays games forever, writing experience and SGF
//! records for the training pipeline.
//!
//! The neural backend is wired behind the `Evaluator` trait; until a real
//! model is plugged in, the uniform baseline evaluator stands in so the
//! whole pipeline can run end to end.

use std::thread;

use crossbeam_channel::bounded;
use log::{error, info};

use sente::core::EngineConfig;
use sente::mcts::SearchAgent;
use sente::predict::{PredictService, UniformEvaluator};
use sente::record::{save_records, GameRecord};
use sente::training::{save_experience, Example, SelfPlayRunner};

fn main() {
    env_logger::init();

    let config = EngineConfig::default();
    info!("starting self-play with {:?}", config);

    let evaluator = Box::new(UniformEvaluator::new(config.rules.num_actions()));
    let service = PredictService::start(evaluator, config.predict_batch_size);

    let (experience_tx, experience_rx) = bounded::<Example>(config.max_game_length);
    let (records_tx, records_rx) = bounded::<GameRecord>(1);

    // writer threads live as long as the process; the driver plays until
    // it is killed
    let _experience_writer = {
        let num_examples_per_file = config.num_examples_per_file;
        let exp_prefix = config.exp_prefix.clone();
        thread::spawn(move || {
            if let Err(err) = save_experience(&experience_rx, num_examples_per_file, &exp_prefix) {
                error!("experience writer failed: {}", err);
            }
        })
    };
    let _record_writer = {
        let rules = config.rules;
        let record_prefix = config.record_prefix.clone();
        thread::spawn(move || {
            if let Err(err) = save_records(&records_rx, &rules, &record_prefix) {
                error!("record writer failed: {}", err);
            }
        })
    };

    let runner = SelfPlayRunner::new(config.clone());
    let mut agent = SearchAgent::new(config, service.sender());

    for game_index in 0.. {
        let (examples, record) = runner.play_game(&mut agent);
        records_tx
            .send(record)
            .expect("record writer disconnected");
        // newest examples first, as the training side expects
        for example in examples.into_iter().rev() {
            experience_tx
                .send(example)
                .expect("experience writer disconnected");
        }
        info!("played game {}", game_index);
    }
}
