//! Compute dispatcher - service layer
//!
//! Sends one row to the compute workers the plan asks for. Never fails:
//! a call that errors, times out or keeps failing after its retries turns
//! into a null-filled `ModeResult`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::clients::{BatchPosition, ComputeRequest, ComputeWorker};
use crate::config::Config;
use crate::error::DispatchError;
use crate::models::{ModeResult, PricingMode, StandardizedRow};
use crate::services::mode_resolver::ResolvedPlan;

pub struct ComputeDispatcher {
    worker: Arc<dyn ComputeWorker>,
    timeout: Duration,
    max_retries: usize,
    retry_delay: Duration,
}

impl ComputeDispatcher {
    pub fn new(worker: Arc<dyn ComputeWorker>, config: &Config) -> Self {
        Self {
            worker,
            timeout: config.dispatch_timeout(),
            max_retries: config.dispatch_retries,
            retry_delay: config.retry_delay(),
        }
    }

    /// Override timeout and retry policy
    pub fn with_policy(mut self, timeout: Duration, max_retries: usize, retry_delay: Duration) -> Self {
        self.timeout = timeout;
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Price one row in one mode
    ///
    /// # Arguments
    /// - `mode`: pricing mode, picks the worker endpoint
    /// - `row`: the standardized row
    /// - `position`: first / last flags forwarded to the worker
    pub async fn dispatch(
        &self,
        mode: PricingMode,
        row: &StandardizedRow,
        position: BatchPosition,
    ) -> ModeResult {
        let request = ComputeRequest::new(row, position, mode);
        let attempts = self.max_retries + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(self.retry_delay).await;
            }

            match self.call_once(&request).await {
                Ok(result) => {
                    info!(
                        "[Sl {}] ✓ {} → {}",
                        row.sl_number,
                        mode,
                        result.price.as_deref().unwrap_or("-")
                    );
                    return result;
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        "[Sl {}] ⚠️ {} (attempt {}/{}), retrying in {:?}",
                        row.sl_number, e, attempt, attempts, self.retry_delay
                    );
                }
                Err(e) => {
                    error!(
                        "[Sl {}] ❌ {} (attempt {}/{}), giving up",
                        row.sl_number, e, attempt, attempts
                    );
                }
            }
        }

        ModeResult::failed()
    }

    /// Fan out every dispatched mode of the plan and wait for all of them
    ///
    /// Calls run concurrently on the current task. A failing mode does not
    /// cancel its siblings.
    pub async fn dispatch_plan(
        &self,
        plan: &ResolvedPlan,
        row: &StandardizedRow,
        position: BatchPosition,
    ) -> BTreeMap<PricingMode, ModeResult> {
        let calls = plan.dispatched().into_iter().map(|mode| async move {
            let result = self.dispatch(mode, row, position).await;
            (mode, result)
        });

        join_all(calls).await.into_iter().collect()
    }

    async fn call_once(&self, request: &ComputeRequest<'_>) -> Result<ModeResult, DispatchError> {
        match timeout(self.timeout, self.worker.compute(request)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout {
                mode: request.mode,
                after: self.timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineClass, RawRow};
    use crate::services::mode_resolver::plan_modes;
    use crate::services::standardizer::standardize;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `fail_first` calls, answers with `$<mode>` afterwards
    struct FlakyWorker {
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ComputeWorker for FlakyWorker {
        async fn compute(&self, request: &ComputeRequest<'_>) -> Result<ModeResult, DispatchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(DispatchError::WorkerFailed { mode: request.mode });
            }
            Ok(ModeResult {
                price: Some(format!("${}", request.mode)),
                ..ModeResult::default()
            })
        }
    }

    /// Never answers in time for `slow_mode`
    struct SlowWorker {
        slow_mode: PricingMode,
    }

    #[async_trait]
    impl ComputeWorker for SlowWorker {
        async fn compute(&self, request: &ComputeRequest<'_>) -> Result<ModeResult, DispatchError> {
            if request.mode == self.slow_mode {
                sleep(Duration::from_secs(60)).await;
            }
            Ok(ModeResult {
                price: Some("$1.00".to_string()),
                ..ModeResult::default()
            })
        }
    }

    fn dispatcher(worker: Arc<dyn ComputeWorker>, retries: usize) -> ComputeDispatcher {
        ComputeDispatcher::new(worker, &Config::default()).with_policy(
            Duration::from_millis(200),
            retries,
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn retry_recovers_a_flaky_call() {
        let worker = Arc::new(FlakyWorker {
            fail_first: 1,
            calls: AtomicUsize::new(0),
        });
        let row = standardize(&RawRow::new(), 1);

        let result = dispatcher(worker.clone(), 1)
            .dispatch(PricingMode::Sud, &row, BatchPosition::of(0, 1))
            .await;

        assert_eq!(result.price.as_deref(), Some("$sud"));
        assert_eq!(worker.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_give_a_null_result() {
        let worker = Arc::new(FlakyWorker {
            fail_first: usize::MAX,
            calls: AtomicUsize::new(0),
        });
        let row = standardize(&RawRow::new(), 1);

        let result = dispatcher(worker.clone(), 2)
            .dispatch(PricingMode::OnDemand, &row, BatchPosition::of(0, 1))
            .await;

        assert!(result.is_failed());
        assert_eq!(worker.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn timeout_only_nulls_the_slow_mode() {
        let worker = Arc::new(SlowWorker {
            slow_mode: PricingMode::ThreeYear,
        });
        let mut row = standardize(&RawRow::new(), 1);
        row.series = "N2".to_string();
        row.machine_class = MachineClass::Regular;
        let plan = plan_modes(&row);

        let results = dispatcher(worker, 0)
            .dispatch_plan(&plan, &row, BatchPosition::of(0, 1))
            .await;

        assert_eq!(results.len(), 4);
        assert!(results[&PricingMode::ThreeYear].is_failed());
        for mode in [PricingMode::Sud, PricingMode::OnDemand, PricingMode::OneYear] {
            assert_eq!(results[&mode].price.as_deref(), Some("$1.00"));
        }
    }

    #[tokio::test]
    async fn only_dispatched_modes_are_called() {
        let worker = Arc::new(FlakyWorker {
            fail_first: 0,
            calls: AtomicUsize::new(0),
        });
        let mut row = standardize(&RawRow::new(), 1);
        row.machine_class = MachineClass::Preemptible;
        let plan = plan_modes(&row);

        let results = dispatcher(worker.clone(), 0)
            .dispatch_plan(&plan, &row, BatchPosition::of(0, 1))
            .await;

        assert_eq!(worker.calls.load(Ordering::SeqCst), 1);
        assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![PricingMode::OnDemand]);
    }
}
