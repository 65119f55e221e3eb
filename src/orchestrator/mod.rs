//! Orchestration layer
//!
//! Runs batches and owns the run lifecycle. No pricing decisions are made
//! here, only scheduling and statistics.
//!
//! ```text
//! App (load → batch → report → notify)
//!     ↓
//! BatchProcessor (Vec<RawRow>, one row at a time)
//!     ↓
//! workflow::RowFlow (one row: validate → standardize → plan → dispatch → aggregate)
//!     ↓
//! services (standardizer / resolver / dispatcher / aggregator)
//!     ↓
//! clients (ComputeWorker)
//! ```
//!
//! Dependencies only point downwards.

pub mod batch_processor;

pub use batch_processor::{App, BatchProcessor, BatchStats, BatchTrigger, RowHook, RunSummary};
