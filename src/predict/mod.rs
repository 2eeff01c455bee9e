//! Batched neural-network prediction.
//!
//! Search workers send `(observation, reply)` requests over a rendezvous
//! channel. One aggregation thread collects requests into batches of up
//! to `predict_batch_size`, runs the `Evaluator` once per batch, and
//! fans the per-sample results back in arrival order. An idle timeout
//! flushes partial batches so a straggling worker is never stuck.

pub mod evaluator;
pub mod service;

pub use evaluator::{Evaluator, UniformEvaluator};
pub use service::{request_prediction, PredictService, Request, Response};
