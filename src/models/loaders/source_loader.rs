use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::BatchError;
use crate::models::raw_row::RawRow;

/// Sheet dumps come either as a bare array or wrapped in `rows`
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSheet {
    Bare(Vec<RawRow>),
    Wrapped { rows: Vec<RawRow> },
}

#[derive(Deserialize)]
struct TomlSheet {
    #[serde(default)]
    rows: Vec<RawRow>,
}

/// Load every input row from a sheet dump (`.json` or `.toml`)
///
/// An unreadable file, a parse failure or a sheet without rows is a
/// `BatchError`: nothing gets dispatched.
pub async fn load_rows(path: &Path) -> Result<Vec<RawRow>, BatchError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::SourceUnreachable {
            path: path.to_path_buf(),
            source,
        })?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    let rows = match extension.as_deref() {
        Some("json") => parse_json_rows(&content).map_err(|message| {
            BatchError::SourceParseFailed {
                path: path.to_path_buf(),
                message,
            }
        })?,
        Some("toml") => parse_toml_rows(&content).map_err(|message| {
            BatchError::SourceParseFailed {
                path: path.to_path_buf(),
                message,
            }
        })?,
        _ => {
            return Err(BatchError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if rows.is_empty() {
        return Err(BatchError::EmptySource {
            source_name: path.display().to_string(),
        });
    }

    tracing::info!(
        "📥 Loaded {} rows from {}",
        rows.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(rows)
}

pub fn parse_json_rows(content: &str) -> Result<Vec<RawRow>, String> {
    let sheet: JsonSheet = serde_json::from_str(content).map_err(|e| e.to_string())?;
    Ok(match sheet {
        JsonSheet::Bare(rows) | JsonSheet::Wrapped { rows } => rows,
    })
}

pub fn parse_toml_rows(content: &str) -> Result<Vec<RawRow>, String> {
    let sheet: TomlSheet = toml::from_str(content).map_err(|e| e.to_string())?;
    Ok(sheet.rows)
}
