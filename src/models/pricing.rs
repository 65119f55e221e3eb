use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownModeError;

/// Pricing mode, one independent compute target each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PricingMode {
    /// Sustained-use discount
    #[serde(rename = "sud")]
    Sud,
    #[serde(rename = "ondemand")]
    OnDemand,
    /// 1-year committed use
    #[serde(rename = "1year")]
    OneYear,
    /// 3-year committed use
    #[serde(rename = "3year")]
    ThreeYear,
}

impl PricingMode {
    pub const ALL: [PricingMode; 4] = [
        PricingMode::Sud,
        PricingMode::OnDemand,
        PricingMode::OneYear,
        PricingMode::ThreeYear,
    ];

    /// Wire name, also used as the report column prefix
    pub fn as_str(self) -> &'static str {
        match self {
            PricingMode::Sud => "sud",
            PricingMode::OnDemand => "ondemand",
            PricingMode::OneYear => "1year",
            PricingMode::ThreeYear => "3year",
        }
    }

}

impl FromStr for PricingMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sud" => Ok(PricingMode::Sud),
            "ondemand" | "on-demand" => Ok(PricingMode::OnDemand),
            "1year" | "1-year" => Ok(PricingMode::OneYear),
            "3year" | "3-year" => Ok(PricingMode::ThreeYear),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one compute call
///
/// All fields `None` means the call failed or never happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeResult {
    pub price: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "machineType")]
    pub machine_type: Option<String>,
    pub specs: Option<String>,
}

/// Price the worker reports when its own automation crashed
const WORKER_ERROR_SENTINEL: &str = "Error";

impl ModeResult {
    /// Null-filled result for a failed dispatch
    pub fn failed() -> Self {
        Self::default()
    }

    pub fn is_failed(&self) -> bool {
        self.price.is_none()
            && self.url.is_none()
            && self.machine_type.is_none()
            && self.specs.is_none()
    }

    /// Normalize a worker reply
    ///
    /// Blank fields become `None`; an error sentinel in `price` marks the
    /// whole result as failed.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let price = clean(self.price);
        if price.as_deref() == Some(WORKER_ERROR_SENTINEL) {
            return Self::failed();
        }

        Self {
            price,
            url: clean(self.url),
            machine_type: clean(self.machine_type),
            specs: clean(self.specs),
        }
    }
}

/// Outcome of one input row
///
/// Built once every applicable mode resolved, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    #[serde(rename = "Sl")]
    pub sl_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<BTreeMap<PricingMode, ModeResult>>,
}

impl RowResult {
    /// Row that went through dispatch
    pub fn completed(sl_number: u32, results: BTreeMap<PricingMode, ModeResult>) -> Self {
        Self {
            sl_number,
            timestamp: Some(Utc::now()),
            error: None,
            results: Some(results),
        }
    }

    /// Row rejected before dispatch
    pub fn rejected(sl_number: u32, error: impl Into<String>) -> Self {
        Self {
            sl_number,
            timestamp: None,
            error: Some(error.into()),
            results: None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }

    pub fn mode(&self, mode: PricingMode) -> Option<&ModeResult> {
        self.results.as_ref().and_then(|r| r.get(&mode))
    }

    /// Number of modes that ended without a price
    pub fn failed_modes(&self) -> usize {
        self.results
            .as_ref()
            .map(|r| r.values().filter(|m| m.is_failed()).count())
            .unwrap_or(0)
    }
}
