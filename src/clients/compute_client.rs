//! Compute worker client
//!
//! One worker per pricing mode, each driving its own browser session against
//! the pricing calculator. To us a worker is a black box behind `POST /compute`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::DispatchError;
use crate::models::{ModeResult, PricingMode, StandardizedRow};
use crate::utils::truncate_text;

/// Where a row sits in the batch
///
/// Workers share calculator state across rows, these flags let them skip
/// steps that the previous row already did or the next one will redo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchPosition {
    pub is_first: bool,
    pub is_last: bool,
}

impl BatchPosition {
    /// Position of the row at `index` (0-based) in a batch of `total`
    pub fn of(index: usize, total: usize) -> Self {
        Self {
            is_first: index == 0,
            is_last: index + 1 == total,
        }
    }
}

/// Body of one compute call
///
/// The row fields are flattened next to the session flags, so the worker
/// sees the sheet headers plus `first`, `last` and `mode`.
#[derive(Debug, Clone, Serialize)]
pub struct ComputeRequest<'a> {
    #[serde(flatten)]
    pub row: &'a StandardizedRow,
    /// First row of the batch
    pub first: bool,
    /// Last row of the batch, the worker skips its "add another estimate" step
    pub last: bool,
    pub mode: PricingMode,
}

impl<'a> ComputeRequest<'a> {
    pub fn new(row: &'a StandardizedRow, position: BatchPosition, mode: PricingMode) -> Self {
        Self {
            row,
            first: position.is_first,
            last: position.is_last,
            mode,
        }
    }
}

/// Something that prices one configuration in one mode
#[async_trait]
pub trait ComputeWorker: Send + Sync {
    async fn compute(&self, request: &ComputeRequest<'_>) -> Result<ModeResult, DispatchError>;
}

/// Endpoint per pricing mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerEndpoints {
    pub sud: String,
    pub ondemand: String,
    pub one_year: String,
    pub three_year: String,
}

impl WorkerEndpoints {
    pub fn endpoint(&self, mode: PricingMode) -> &str {
        match mode {
            PricingMode::Sud => &self.sud,
            PricingMode::OnDemand => &self.ondemand,
            PricingMode::OneYear => &self.one_year,
            PricingMode::ThreeYear => &self.three_year,
        }
    }

    /// Every mode served by the same base URL, handy for a single worker
    /// that reads `mode` from the body
    pub fn shared(base_url: &str) -> Self {
        let url = format!("{}/compute", base_url.trim_end_matches('/'));
        Self {
            sud: url.clone(),
            ondemand: url.clone(),
            one_year: url.clone(),
            three_year: url,
        }
    }
}

impl Default for WorkerEndpoints {
    fn default() -> Self {
        Self {
            sud: "http://localhost:4001/compute".to_string(),
            ondemand: "http://localhost:4002/compute".to_string(),
            one_year: "http://localhost:4003/compute".to_string(),
            three_year: "http://localhost:4004/compute".to_string(),
        }
    }
}

/// HTTP compute worker client
pub struct HttpComputeWorker {
    client: Client,
    endpoints: WorkerEndpoints,
    timeout: Duration,
}

impl HttpComputeWorker {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Self::with_endpoints(config.worker_endpoints.clone(), config.dispatch_timeout())
    }

    pub fn with_endpoints(
        endpoints: WorkerEndpoints,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoints,
            timeout,
        })
    }

    pub fn endpoints(&self) -> &WorkerEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl ComputeWorker for HttpComputeWorker {
    async fn compute(&self, request: &ComputeRequest<'_>) -> Result<ModeResult, DispatchError> {
        let mode = request.mode;
        let endpoint = self.endpoints.endpoint(mode);
        debug!("[{}] POST {} (Sl {})", mode, endpoint, request.row.sl_number);

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    DispatchError::Timeout {
                        mode,
                        after: self.timeout,
                    }
                } else {
                    DispatchError::RequestFailed {
                        mode,
                        endpoint: endpoint.to_string(),
                        source,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::BadStatus {
                mode,
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::InvalidBody {
                mode,
                message: e.to_string(),
            })?;
        let result: ModeResult =
            serde_json::from_str(&body).map_err(|e| DispatchError::InvalidBody {
                mode,
                message: format!("{} in body '{}'", e, truncate_text(&body, 120)),
            })?;

        let result = result.normalized();
        if result.is_failed() {
            return Err(DispatchError::WorkerFailed { mode });
        }

        Ok(result)
    }
}
