//! Report writing service - service layer
//!
//! Only knows how to turn row results into the output report file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{ModeResult, PricingMode, RowResult};

/// Modes consulted, in order, for the row's machine type and specs
const DESCRIPTION_SOURCES: [PricingMode; 4] = [
    PricingMode::OnDemand,
    PricingMode::Sud,
    PricingMode::OneYear,
    PricingMode::ThreeYear,
];

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    #[serde(rename = "Sl")]
    pub sl_number: u32,
    #[serde(rename = "machineType")]
    pub machine_type: Option<String>,
    pub specs: Option<String>,
    pub sud_price: Option<String>,
    pub sud_url: Option<String>,
    pub ondemand_price: Option<String>,
    pub ondemand_url: Option<String>,
    #[serde(rename = "1year_price")]
    pub one_year_price: Option<String>,
    #[serde(rename = "1year_url")]
    pub one_year_url: Option<String>,
    #[serde(rename = "3year_price")]
    pub three_year_price: Option<String>,
    #[serde(rename = "3year_url")]
    pub three_year_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl From<&RowResult> for ReportRecord {
    fn from(row: &RowResult) -> Self {
        let mode = |m: PricingMode| row.mode(m).cloned().unwrap_or_default();
        let described = |field: fn(&ModeResult) -> Option<String>| {
            DESCRIPTION_SOURCES
                .iter()
                .find_map(|m| row.mode(*m).and_then(field))
        };

        let (sud, ondemand, one_year, three_year) = (
            mode(PricingMode::Sud),
            mode(PricingMode::OnDemand),
            mode(PricingMode::OneYear),
            mode(PricingMode::ThreeYear),
        );

        Self {
            sl_number: row.sl_number,
            machine_type: described(|m| m.machine_type.clone()),
            specs: described(|m| m.specs.clone()),
            sud_price: sud.price,
            sud_url: sud.url,
            ondemand_price: ondemand.price,
            ondemand_url: ondemand.url,
            one_year_price: one_year.price,
            one_year_url: one_year.url,
            three_year_price: three_year.price,
            three_year_url: three_year.url,
            timestamp: row.timestamp,
            error: row.error.clone(),
        }
    }
}

/// Whole report, as written to disk
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub recipients: Vec<String>,
    pub rows: Vec<ReportRecord>,
}

impl Report {
    /// Records are ordered by `Sl` whatever order the results came in
    pub fn new(results: &[RowResult], recipients: &[String]) -> Self {
        let mut rows: Vec<ReportRecord> = results.iter().map(ReportRecord::from).collect();
        rows.sort_by_key(|r| r.sl_number);

        Self {
            title: format!(
                "GCP Compute Pricing Results - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            generated_at: Utc::now(),
            recipients: recipients.to_vec(),
            rows,
        }
    }
}

pub struct ReportWriter {
    report_path: PathBuf,
}

impl ReportWriter {
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: report_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// Write the report, creating the parent directory if needed
    pub async fn write(&self, report: &Report) -> AppResult<PathBuf> {
        debug!(
            "writing {} report rows to {}",
            report.rows.len(),
            self.report_path.display()
        );

        let io_err = |source: std::io::Error| AppError::Report {
            path: self.report_path.clone(),
            source,
        };

        if let Some(parent) = self.report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let body = serde_json::to_vec_pretty(report)
            .map_err(|e| io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        fs::write(&self.report_path, body).await.map_err(io_err)?;

        Ok(self.report_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn completed() -> RowResult {
        let ondemand = ModeResult {
            price: Some("$20.00".into()),
            url: Some("https://calc/od".into()),
            machine_type: None,
            specs: None,
        };
        let one_year = ModeResult {
            price: Some("$14.00".into()),
            url: Some("https://calc/1y".into()),
            machine_type: Some("e2-custom-4-16384".into()),
            specs: Some("4 vCPUs, 16 GB RAM".into()),
        };
        RowResult::completed(
            2,
            BTreeMap::from([
                (PricingMode::Sud, ondemand.clone()),
                (PricingMode::OnDemand, ondemand),
                (PricingMode::OneYear, one_year),
                (PricingMode::ThreeYear, ModeResult::failed()),
            ]),
        )
    }

    #[test]
    fn record_flattens_modes_into_columns() {
        let record = ReportRecord::from(&completed());

        assert_eq!(record.sl_number, 2);
        assert_eq!(record.sud_price, record.ondemand_price);
        assert_eq!(record.one_year_url.as_deref(), Some("https://calc/1y"));
        assert_eq!(record.three_year_price, None);
        // ondemand had no description, the first mode that has one is used
        assert_eq!(record.machine_type.as_deref(), Some("e2-custom-4-16384"));
        assert!(record.error.is_none());
    }

    #[test]
    fn record_columns_use_sheet_names() {
        let json = serde_json::to_value(ReportRecord::from(&completed())).unwrap();
        for column in [
            "Sl", "machineType", "specs", "sud_price", "sud_url", "ondemand_price",
            "ondemand_url", "1year_price", "1year_url", "3year_price", "3year_url",
            "timestamp", "Error",
        ] {
            assert!(json.get(column).is_some(), "missing column {}", column);
        }
    }

    #[test]
    fn report_orders_rows_by_sl() {
        let results = vec![completed(), RowResult::rejected(1, "Missing required fields: RAM")];
        let report = Report::new(&results, &["ops@example.com".to_string()]);

        assert_eq!(report.rows[0].sl_number, 1);
        assert_eq!(report.rows[0].error.as_deref(), Some("Missing required fields: RAM"));
        assert_eq!(report.rows[1].sl_number, 2);
        assert!(report.title.starts_with("GCP Compute Pricing Results - "));
    }

    #[tokio::test]
    async fn writes_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let writer = ReportWriter::new(&path);

        let written = writer.write(&Report::new(&[completed()], &[])).await.unwrap();

        let content = tokio::fs::read_to_string(written).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["rows"][0]["ondemand_price"], "$20.00");
    }
}
