use std::time::Duration;

use crate::clients::WorkerEndpoints;
use crate::error::ConfigError;
use crate::models::PricingMode;

/// Program configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Compute worker per pricing mode
    pub worker_endpoints: WorkerEndpoints,
    /// Upper bound for one compute call, a browser run takes a while
    pub dispatch_timeout_secs: u64,
    /// Extra attempts after a failed compute call
    pub dispatch_retries: usize,
    /// Pause between attempts
    pub retry_delay_ms: u64,
    /// Where the JSON report goes
    pub report_path: String,
    /// Whether to log at debug level
    pub verbose_logging: bool,
    /// Run log (streamed events are appended here)
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_endpoints: WorkerEndpoints::default(),
            dispatch_timeout_secs: 300,
            dispatch_retries: 1,
            retry_delay_ms: 2000,
            report_path: "tmp/compute-results.json".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let endpoints = default.worker_endpoints;
        Self {
            worker_endpoints: WorkerEndpoints {
                sud: std::env::var("SUD_WORKER_URL").unwrap_or(endpoints.sud),
                ondemand: std::env::var("ONDEMAND_WORKER_URL").unwrap_or(endpoints.ondemand),
                one_year: std::env::var("ONE_YEAR_WORKER_URL").unwrap_or(endpoints.one_year),
                three_year: std::env::var("THREE_YEAR_WORKER_URL").unwrap_or(endpoints.three_year),
            },
            dispatch_timeout_secs: std::env::var("DISPATCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dispatch_timeout_secs),
            dispatch_retries: std::env::var("DISPATCH_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dispatch_retries),
            retry_delay_ms: std::env::var("RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_ms),
            report_path: std::env::var("REPORT_PATH").unwrap_or(default.report_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Reject endpoints that are not URLs and a zero timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        for mode in PricingMode::ALL {
            let value = self.worker_endpoints.endpoint(mode);
            if reqwest::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidEndpoint {
                    mode,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
