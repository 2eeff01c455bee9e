//! Prediction service integration tests: batch formation, timeout flush,
//! reply ordering.

use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;

use sente::game::Observation;
use sente::predict::{request_prediction, Evaluator, PredictService, Request, Response};

/// Evaluator that records every batch size it sees and echoes each
/// observation's first element back as the value.
struct RecordingEvaluator {
    batch_sizes: Arc<Mutex<Vec<usize>>>,
    num_actions: usize,
}

impl Evaluator for RecordingEvaluator {
    fn evaluate(&self, batch: &[Observation]) -> (Vec<Vec<f32>>, Vec<f32>) {
        self.batch_sizes.lock().unwrap().push(batch.len());
        let policies = batch.iter().map(|_| vec![0.0; self.num_actions]).collect();
        let values = batch.iter().map(|obs| obs.tensor[0]).collect();
        (policies, values)
    }
}

fn tagged_observation(tag: f32) -> Observation {
    let mut obs = Observation::zeros([3, 3, 3]);
    obs.tensor[0] = tag;
    obs
}

// When a full complement of workers requests at once, exactly one batch
// of exactly that size is dispatched.
#[test]
fn test_batch_saturation() {
    let batch_sizes = Arc::new(Mutex::new(Vec::new()));
    let service = PredictService::start(
        Box::new(RecordingEvaluator {
            batch_sizes: Arc::clone(&batch_sizes),
            num_actions: 10,
        }),
        4,
    );

    let barrier = Arc::new(Barrier::new(4));
    let mut handles = Vec::new();
    for tag in 0..4 {
        let sender = service.sender();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            request_prediction(&sender, tagged_observation(tag as f32))
        }));
    }
    for handle in handles {
        let response = handle.join().unwrap();
        assert_eq!(response.policy.len(), 10);
    }

    let sizes = batch_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![4], "expected one saturated batch, got {:?}", sizes);
    service.stop();
}

// Fewer requests than a batch are flushed by the idle timeout.
#[test]
fn test_timeout_flush() {
    let batch_sizes = Arc::new(Mutex::new(Vec::new()));
    let service = PredictService::start(
        Box::new(RecordingEvaluator {
            batch_sizes: Arc::clone(&batch_sizes),
            num_actions: 10,
        }),
        8,
    );

    let (reply_tx, reply_rx) = bounded::<Response>(1);
    let (reply_tx2, reply_rx2) = bounded::<Response>(1);
    let sender = service.sender();
    sender
        .send(Request {
            observation: tagged_observation(1.0),
            reply: reply_tx,
        })
        .unwrap();
    sender
        .send(Request {
            observation: tagged_observation(2.0),
            reply: reply_tx2,
        })
        .unwrap();

    // well past 2x the 1ms idle timeout
    let first = reply_rx.recv_timeout(Duration::from_millis(100)).unwrap();
    let second = reply_rx2.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(first.value, 1.0);
    assert_eq!(second.value, 2.0);

    let sizes = batch_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![2], "partial batch must flush as one, got {:?}", sizes);
    service.stop();
}

// Replies match their requests even when many are in flight.
#[test]
fn test_replies_match_requests() {
    let service = PredictService::start(
        Box::new(RecordingEvaluator {
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
            num_actions: 10,
        }),
        3,
    );

    let mut handles = Vec::new();
    for tag in 0..12 {
        let sender = service.sender();
        handles.push(thread::spawn(move || {
            let response = request_prediction(&sender, tagged_observation(tag as f32));
            (tag as f32, response.value)
        }));
    }
    for handle in handles {
        let (sent, received) = handle.join().unwrap();
        assert_eq!(sent, received);
    }
    service.stop();
}

// Stop drains whatever is pending before the thread exits.
#[test]
fn test_stop_drains_pending() {
    let batch_sizes = Arc::new(Mutex::new(Vec::new()));
    let service = PredictService::start(
        Box::new(RecordingEvaluator {
            batch_sizes: Arc::clone(&batch_sizes),
            num_actions: 10,
        }),
        8,
    );

    let (reply_tx, reply_rx) = bounded::<Response>(1);
    service
        .sender()
        .send(Request {
            observation: tagged_observation(7.0),
            reply: reply_tx,
        })
        .unwrap();

    service.stop();
    let response = reply_rx.try_recv().expect("pending request must be answered");
    assert_eq!(response.value, 7.0);

    let sizes = batch_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![1]);
}
