//! Log helpers
//!
//! Banner and statistics output shared by the binary and the orchestrator

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Run log header, streamed events are appended below it
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nGCP compute pricing run - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );

    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
    }
    fs::write(log_file_path, log_header)
        .with_context(|| format!("writing log header to {}", log_file_path))?;
    Ok(())
}

pub fn log_startup(source: &Path, recipients: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Pricing run started");
    info!("📁 Source: {}", source.display());
    info!("📧 Recipients: {}", recipients);
    info!("{}", "=".repeat(60));
}

pub fn log_rows_loaded(total: usize) {
    info!("✓ Loaded {} rows", total);
    info!("💡 Rows are priced one at a time, modes of a row in parallel\n");
}

/// Closing banner
///
/// - `completed`: every mode priced
/// - `partial`: at least one mode left empty
/// - `rejected`: failed validation, never dispatched
pub fn print_final_stats(
    completed: usize,
    partial: usize,
    rejected: usize,
    total: usize,
    report_path: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Run summary");
    info!(
        "Finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ Fully priced: {}/{}", completed, total);
    info!("⚠️ Partially priced: {}", partial);
    info!("❌ Rejected: {}", rejected);
    info!("{}", "=".repeat(60));
    info!("\nReport saved to: {}", report_path.display());
}

/// Cut long text (worker bodies, error messages) for log display
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
