//! The request-aggregating prediction service.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, info};

use crate::game::Observation;

use super::evaluator::Evaluator;

/// Flush a partial batch after this long without a new request.
const IDLE_TIMEOUT: Duration = Duration::from_millis(1);

/// One prediction request: the observation and where to send the answer.
#[derive(Debug)]
pub struct Request {
    /// Observation tensor for the side to move.
    pub observation: Observation,

    /// One-shot reply channel.
    pub reply: Sender<Response>,
}

/// Per-sample model output.
#[derive(Clone, Debug)]
pub struct Response {
    /// Policy logits over the full action space.
    pub policy: Vec<f32>,

    /// Value in `[-1, 1]` for the side to move.
    pub value: f32,
}

/// Handle to the running prediction service.
///
/// `start` spawns the aggregation thread; `stop` drains whatever is
/// pending, dispatches it as a final batch and joins the thread.
pub struct PredictService {
    request_tx: Sender<Request>,
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PredictService {
    /// Start the service with the given evaluator.
    ///
    /// The request channel is a rendezvous: senders block until the
    /// aggregator takes their request, which throttles simulation issue
    /// rate to evaluation throughput.
    pub fn start(evaluator: Box<dyn Evaluator>, batch_size: usize) -> Self {
        assert!(batch_size >= 1, "batch size must be at least 1");

        let (request_tx, request_rx) = bounded::<Request>(0);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("predict".to_string())
            .spawn(move || aggregate(evaluator, batch_size, &request_rx, &shutdown_rx))
            .expect("could not spawn the prediction thread");

        Self {
            request_tx,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// A sender for submitting requests; clone one per worker.
    #[must_use]
    pub fn sender(&self) -> Sender<Request> {
        self.request_tx.clone()
    }

    /// Drain pending requests, dispatch them, and terminate the worker.
    ///
    /// Blocks until the aggregation thread has exited.
    pub fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            handle.join().expect("prediction thread panicked");
        }
    }
}

impl Drop for PredictService {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Aggregation loop: batch on size, flush on idle timeout.
fn aggregate(
    evaluator: Box<dyn Evaluator>,
    batch_size: usize,
    request_rx: &Receiver<Request>,
    shutdown_rx: &Receiver<()>,
) {
    let mut pending: Vec<Request> = Vec::with_capacity(batch_size);
    let mut num_requests = 0u64;
    let mut num_timeouts = 0u64;

    loop {
        select! {
            recv(request_rx) -> request => {
                match request {
                    Ok(request) => {
                        pending.push(request);
                        num_requests += 1;
                        debug!("there have been {} prediction requests", num_requests);

                        if pending.len() == batch_size {
                            dispatch(&*evaluator, &mut pending);
                        }
                    }
                    // every sender dropped: drain and exit
                    Err(_) => break,
                }
            }
            recv(shutdown_rx) -> _ => break,
            default(IDLE_TIMEOUT) => {
                if !pending.is_empty() {
                    dispatch(&*evaluator, &mut pending);
                }
                num_timeouts += 1;
                debug!(
                    "there have been {} timeouts at {} prediction requests",
                    num_timeouts, num_requests
                );
            }
        }
    }

    if !pending.is_empty() {
        dispatch(&*evaluator, &mut pending);
    }
    info!(
        "prediction service stopping after {} requests, {} timeouts",
        num_requests, num_timeouts
    );
}

/// Run one forward pass and fan the results back in arrival order.
fn dispatch(evaluator: &dyn Evaluator, pending: &mut Vec<Request>) {
    let observations: Vec<Observation> = pending
        .iter()
        .map(|request| request.observation.clone())
        .collect();

    let (policies, values) = evaluator.evaluate(&observations);
    assert_eq!(
        policies.len(),
        pending.len(),
        "evaluator returned a malformed policy batch"
    );
    assert_eq!(
        values.len(),
        pending.len(),
        "evaluator returned a malformed value batch"
    );

    for (request, (policy, value)) in pending
        .drain(..)
        .zip(policies.into_iter().zip(values.into_iter()))
    {
        // a dropped receiver means the searcher is gone; nothing to do
        let _ = request.reply.send(Response { policy, value });
    }
}

/// Submit one observation and block for the response.
///
/// This is the single suspension point of a simulation worker.
pub fn request_prediction(predict_tx: &Sender<Request>, observation: Observation) -> Response {
    let (reply_tx, reply_rx) = bounded(1);
    predict_tx
        .send(Request {
            observation,
            reply: reply_tx,
        })
        .expect("prediction service is not running");
    reply_rx
        .recv()
        .expect("prediction service dropped a request")
}
