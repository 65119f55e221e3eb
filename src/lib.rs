//! # GCP Pricing Automation
//!
//! Batch orchestrator that prices machine specifications on the public cloud
//! pricing calculator through per-mode compute workers.
//!
//! ## Architecture
//!
//! Four layers, dependencies pointing down only:
//!
//! ### ① Clients
//! - `clients/` - the `ComputeWorker` seam
//! - `HttpComputeWorker` - one `POST /compute` endpoint per pricing mode
//!
//! ### ② Services
//! - `services/` - "what can be done to one row"
//! - `standardize` - raw sheet row to canonical machine spec
//! - `plan_modes` - which modes are dispatched, which are copied
//! - `ComputeDispatcher` - timeout + retry around a worker call
//! - `aggregate` - per-mode results to one `RowResult`
//! - `ReportWriter` / `Notifier` - output side
//!
//! ### ③ Workflow
//! - `workflow/` - the full life of one row
//! - `RowCtx` - Sl number and batch position
//! - `RowFlow` - validate → standardize → plan → fan-out → aggregate
//!
//! ### ④ Orchestration
//! - `orchestrator/batch_processor` - sequential batch, report, notification

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use clients::{ComputeWorker, HttpComputeWorker};
pub use config::Config;
pub use error::{AppError, AppResult, BatchError, ConfigError, DispatchError, ValidationError};
pub use models::{ModeResult, PricingMode, RawRow, RowResult, StandardizedRow};
pub use orchestrator::{App, BatchProcessor, BatchTrigger, RunSummary};
pub use workflow::{RowCtx, RowFlow};
