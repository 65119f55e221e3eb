use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::PricingMode;

/// Application error type
///
/// Only `Batch`, `Config` and `Report` ever reach the top level. Validation
/// and dispatch errors are absorbed at the row / mode boundary and surface as
/// data in the report.
#[derive(Debug, Error)]
pub enum AppError {
    /// The run could not start (source unreachable, empty, ...)
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),
    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The report file could not be written
    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Row-level, fatal to the row only
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { sl_number: u32, fields: Vec<String> },
}

/// Mode-level, recovered locally by the dispatcher
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("[{mode}] request to {endpoint} failed: {source}")]
    RequestFailed {
        mode: PricingMode,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("[{mode}] {endpoint} answered with status {status}")]
    BadStatus {
        mode: PricingMode,
        endpoint: String,
        status: u16,
    },
    #[error("[{mode}] no answer within {after:?}")]
    Timeout { mode: PricingMode, after: Duration },
    #[error("[{mode}] malformed worker response: {message}")]
    InvalidBody { mode: PricingMode, message: String },
    #[error("[{mode}] worker reported a failed computation")]
    WorkerFailed { mode: PricingMode },
}

/// Fatal, aborts the run before any dispatch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input source {} is unreachable: {source}", path.display())]
    SourceUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input source {} could not be parsed: {message}", path.display())]
    SourceParseFailed { path: PathBuf, message: String },
    #[error("unsupported input format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("no rows found in {source_name}")]
    EmptySource { source_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker endpoint for {mode} is not a valid URL: '{value}'")]
    InvalidEndpoint { mode: PricingMode, value: String },
    #[error("dispatch timeout must be greater than zero")]
    ZeroTimeout,
}

/// A pricing mode name nobody recognizes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pricing mode '{0}'")]
pub struct UnknownModeError(pub String);

// ========== Result alias ==========

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_every_field() {
        let err = ValidationError::MissingFields {
            sl_number: 4,
            fields: vec!["No. of Instances".into(), "OS with version".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required fields: No. of Instances, OS with version"
        );
    }

    #[test]
    fn run_level_errors_convert_into_app_error() {
        let err: AppError = ConfigError::ZeroTimeout.into();
        assert!(matches!(err, AppError::Config(ConfigError::ZeroTimeout)));

        let err: AppError = BatchError::EmptySource {
            source_name: "rows.json".into(),
        }
        .into();
        assert!(err.to_string().starts_with("batch error:"));
    }

    #[test]
    fn dispatch_error_names_its_mode() {
        let err = DispatchError::Timeout {
            mode: PricingMode::OneYear,
            after: Duration::from_secs(3),
        };
        assert!(err.to_string().starts_with("[1year]"));
    }
}
