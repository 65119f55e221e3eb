pub mod compute_client;

pub use compute_client::{BatchPosition, ComputeRequest, ComputeWorker, HttpComputeWorker, WorkerEndpoints};
