//! Batch processor - orchestration layer
//!
//! Entry point of a pricing run:
//!
//! 1. **Load**: read the input rows from the trigger's source
//! 2. **Price**: hand rows to `RowFlow` one at a time, in input order
//! 3. **Report**: write every `RowResult` (rejected rows included)
//! 4. **Notify**: pass the report to the recipient list
//! 5. **Stats**: closing summary
//!
//! Rows never overlap. Row N is finalized before row N+1 is dispatched, the
//! workers share calculator state between consecutive rows.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::clients::{ComputeWorker, HttpComputeWorker};
use crate::config::Config;
use crate::error::{AppError, BatchError};
use crate::models::{load_rows, RawRow, RowResult};
use crate::services::{parse_recipients, ComputeDispatcher, Notifier, NotifyOutcome, Report, ReportWriter};
use crate::utils::logging::{log_rows_loaded, log_startup, print_final_stats};
use crate::workflow::{RowCtx, RowFlow};

const DEFAULT_SOURCE_PATH: &str = "tmp/compute-engine.json";

/// Called with each row result as soon as it is final
pub type RowHook = Box<dyn Fn(&RowResult) + Send + Sync>;

/// Per-run inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTrigger {
    /// Input sheet export (`.json` or `.toml`)
    pub source: PathBuf,
    /// Who gets the report
    pub recipients: Vec<String>,
}

impl BatchTrigger {
    pub fn new(source: impl Into<PathBuf>, recipients: Vec<String>) -> Self {
        Self {
            source: source.into(),
            recipients,
        }
    }

    /// `SOURCE_PATH` and the comma separated `EMAILS`
    pub fn from_env() -> Self {
        let source = std::env::var("SOURCE_PATH").unwrap_or_else(|_| DEFAULT_SOURCE_PATH.to_string());
        let recipients = std::env::var("EMAILS")
            .map(|raw| parse_recipients(&raw))
            .unwrap_or_default();
        Self::new(source, recipients)
    }
}

/// Row tally of a finished batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    /// All four modes priced
    pub completed: usize,
    /// Dispatched, at least one mode left empty
    pub partial: usize,
    /// Failed validation
    pub rejected: usize,
    /// Empty modes across all dispatched rows
    pub failed_modes: usize,
}

impl BatchStats {
    pub fn from_results(results: &[RowResult]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            if result.is_rejected() {
                stats.rejected += 1;
                continue;
            }
            let failed = result.failed_modes();
            stats.failed_modes += failed;
            if failed == 0 {
                stats.completed += 1;
            } else {
                stats.partial += 1;
            }
        }
        stats
    }
}

/// Sequential row processor
pub struct BatchProcessor {
    flow: RowFlow,
    on_row_complete: Option<RowHook>,
}

impl BatchProcessor {
    pub fn new(flow: RowFlow) -> Self {
        Self {
            flow,
            on_row_complete: None,
        }
    }

    pub fn on_row_complete(mut self, hook: impl Fn(&RowResult) + Send + Sync + 'static) -> Self {
        self.on_row_complete = Some(Box::new(hook));
        self
    }

    /// Price every row, in order, one at a time
    ///
    /// Returns one result per input row, ordered by `Sl`. Row failures are
    /// data; only an empty batch is an error.
    pub async fn process_batch(&self, rows: &[RawRow]) -> Result<Vec<RowResult>, BatchError> {
        if rows.is_empty() {
            return Err(BatchError::EmptySource {
                source_name: "input batch".to_string(),
            });
        }

        let total = rows.len();
        let mut results: BTreeMap<u32, RowResult> = BTreeMap::new();

        for (index, raw) in rows.iter().enumerate() {
            let ctx = RowCtx::new(index, total);
            info!("\n{}", "─".repeat(60));
            info!("{} 📄 Processing row", ctx);

            let result = self.flow.run(raw, &ctx).await;

            if let Some(hook) = &self.on_row_complete {
                hook(&result);
            }
            results.insert(result.sl_number, result);
        }

        Ok(results.into_values().collect())
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: BatchStats,
    pub report_path: PathBuf,
    pub notified: NotifyOutcome,
    pub results: Vec<RowResult>,
}

/// Application root
pub struct App {
    processor: BatchProcessor,
    report_writer: ReportWriter,
    notifier: Notifier,
}

impl App {
    /// Validate the configuration and wire the HTTP workers
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate().map_err(AppError::from)?;

        let worker = HttpComputeWorker::new(&config).context("building compute worker client")?;
        info!("🔌 Workers: sud={} ondemand={} 1year={} 3year={}",
            worker.endpoints().sud,
            worker.endpoints().ondemand,
            worker.endpoints().one_year,
            worker.endpoints().three_year,
        );

        Ok(Self::with_worker(config, Arc::new(worker)))
    }

    /// Wire an arbitrary worker (stubs in tests)
    pub fn with_worker(config: Config, worker: Arc<dyn ComputeWorker>) -> Self {
        let dispatcher = ComputeDispatcher::new(worker, &config);
        Self {
            processor: BatchProcessor::new(RowFlow::new(dispatcher)),
            report_writer: ReportWriter::new(&config.report_path),
            notifier: Notifier::new(),
        }
    }

    pub fn with_processor(mut self, processor: BatchProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Run one batch end to end
    ///
    /// Aborts before any dispatch when the source cannot be loaded. Once the
    /// batch ran, the report is written even if every row failed.
    pub async fn run(&self, trigger: &BatchTrigger) -> Result<RunSummary> {
        log_startup(&trigger.source, trigger.recipients.len());

        info!("\n📁 Loading rows from {}", trigger.source.display());
        let rows = load_rows(&trigger.source).await.map_err(|e| {
            error!("❌ Cannot load source: {}", e);
            AppError::from(e)
        })?;
        log_rows_loaded(rows.len());

        let results = self.processor.process_batch(&rows).await.map_err(AppError::from)?;
        let stats = BatchStats::from_results(&results);

        let report = Report::new(&results, &trigger.recipients);
        let report_path = self
            .report_writer
            .write(&report)
            .await
            .context("writing pricing report")?;
        info!("💾 Report written: {}", report_path.display());

        let notified = self.notifier.notify(&report_path, &trigger.recipients);
        if !notified.skipped.is_empty() {
            warn!("⚠️ {} recipient(s) skipped", notified.skipped.len());
        }

        print_final_stats(
            stats.completed,
            stats.partial,
            stats.rejected,
            stats.total,
            &report_path,
        );

        Ok(RunSummary {
            stats,
            report_path,
            notified,
            results,
        })
    }
}
