//! Flatten the per-listing records into one CSV file.

use crate::models::sentinel::UNKNOWN;
use crate::models::ListingRecord;
use crate::scrapers::detail::RECORD_FILE;
use anyhow::{Context, Result};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const HEADER: [&str; 9] = [
    "Id",
    "Title",
    "Description",
    "Make",
    "Model",
    "Year",
    "Kilometers",
    "Import History",
    "Litres per 100km",
];

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub rows: usize,
    /// Record files that could not be read as a listing record
    pub skipped: Vec<PathBuf>,
}

/// Walk `input_dir` for record files and write them as rows to `output`.
///
/// Files are visited in path order. A file that does not parse as a
/// listing record is skipped with a warning.
pub fn export_csv(input_dir: &Path, output: &Path) -> Result<ExportSummary> {
    let mut summary = ExportSummary::default();
    let mut rows = Vec::new();

    for path in record_files(input_dir) {
        match read_record(&path) {
            Ok(record) => rows.push(row(&record)),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                summary.skipped.push(path);
            }
        }
    }

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    writer.write_record(HEADER)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    summary.rows = rows.len();
    info!(
        "CSV file saved to {} ({} rows, {} skipped)",
        output.display(),
        summary.rows,
        summary.skipped.len()
    );
    Ok(summary)
}

fn record_files(input_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Cannot read entry under {}: {}", input_dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect()
}

fn read_record(path: &Path) -> Result<ListingRecord> {
    let raw = std::fs::read_to_string(path)?;
    let record = serde_json::from_str(&raw)?;
    Ok(record)
}

/// Sentinels become the display placeholder
fn cell<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn row(record: &ListingRecord) -> [String; 9] {
    let detail = &record.scraped_listing;
    [
        record.listing.id.to_string(),
        record.listing.title.clone(),
        detail.description.clone(),
        cell(detail.make.as_deref()),
        cell(detail.model.as_deref()),
        cell(detail.year),
        cell(detail.kilometers),
        cell(detail.import_history),
        cell(detail.fuel_economy),
    ]
}
