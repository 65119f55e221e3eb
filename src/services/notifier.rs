//! Report notification - service layer
//!
//! Hands the finished report to the people on the notification list.
//! Sharing the document itself is done by whoever hosts the report; here the
//! recipients are validated and each hand-off is logged.

use std::path::Path;

use tracing::{info, warn};

/// Split a comma separated recipient list, dropping blanks
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Who got the report and who was skipped
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub delivered: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    /// Notify every valid address, skip the rest with a warning
    pub fn notify(&self, report_path: &Path, recipients: &[String]) -> NotifyOutcome {
        let mut outcome = NotifyOutcome::default();

        for recipient in recipients {
            if !recipient.contains('@') {
                warn!("⚠️ Skipping invalid email: {}", recipient);
                outcome.skipped.push(recipient.clone());
                continue;
            }
            info!("📨 Report {} handed off to {}", report_path.display(), recipient);
            outcome.delivered.push(recipient.clone());
        }

        if recipients.is_empty() {
            info!("ℹ️ No recipients, report left at {}", report_path.display());
        }

        outcome
    }
}
