//! CSV export of result tables
//!
//! Every table the dashboard shows can be offered as a download. Export is
//! total: an empty table still produces a header row.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Table;
use crate::utils::sanitize_filename;

/// MIME type of exported tables
pub const CSV_MIME: &str = "text/csv";

/// Serialize a table to CSV bytes with a header row
///
/// Fields are quoted only when needed. Rows are written in table order.
pub fn serialize_to_delimited(table: &Table) -> Vec<u8> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    // In-memory writer; errors here are logged, not returned.
    if let Err(e) = writer.write_record(&table.columns) {
        tracing::error!(error = %e, "Failed to write CSV header");
    }
    for row in &table.rows {
        if let Err(e) = writer.write_record(row.iter().map(ToString::to_string)) {
            tracing::error!(error = %e, "Failed to write CSV row");
        }
    }

    match writer.into_inner() {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to flush CSV buffer");
            Vec::new()
        }
    }
}

/// A file offered to the user for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub label: String,
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// CSV download of a table
    pub fn csv(label: impl Into<String>, file_name: impl Into<String>, table: &Table) -> Self {
        Self {
            label: label.into(),
            file_name: file_name.into(),
            mime: CSV_MIME,
            bytes: serialize_to_delimited(table),
        }
    }

    /// Inline `data:` URI for an HTML download link
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Write the file into `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "Saved download");
        Ok(path)
    }
}

/// File name of the interest-over-time export
pub fn time_series_file_name() -> String {
    "interest_over_time.csv".to_string()
}

/// File name of a keyword's related-query export (`kind` is "top" or "rising")
pub fn related_file_name(keyword: &str, kind: &str) -> String {
    format!("{}related_{kind}.csv", sanitize_filename(keyword))
}

/// `name` with `_<n>` inserted before its extension
pub fn numbered_file_name(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{n}.{ext}"),
        None => format!("{name}_{n}"),
    }
}
