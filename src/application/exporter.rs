//! Spreadsheet export of chat records.
//!
//! Builds a single `Chat Logs` worksheet with one row per record and writes
//! it as `.xlsx` next to a timestamped filename.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use rust_xlsxwriter::Workbook;

use crate::domain::{ChatRecord, ExportError};

/// Name of the single worksheet in every export.
pub const SHEET_NAME: &str = "Chat Logs";

/// Header text and column width, in output order.
///
/// Content comes before Time; existing consumers rely on this order.
pub const COLUMNS: [(&str, f64); 6] = [
    ("ID", 10.0),
    ("scopeId", 10.0),
    ("UserID", 10.0),
    ("Username", 10.0),
    ("Content", 30.0),
    ("Time", 20.0),
];

/// Longest string Excel accepts in a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// A single worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text cell, cut to [`MAX_CELL_CHARS`] on a char boundary.
    #[must_use]
    pub fn text(s: &str) -> Self {
        if s.chars().count() <= MAX_CELL_CHARS {
            Self::Text(s.to_string())
        } else {
            Self::Text(s.chars().take(MAX_CELL_CHARS).collect())
        }
    }
}

/// In-memory tabular form of an export.
#[derive(Debug, Clone, Default)]
pub struct ExportDocument {
    rows: Vec<Vec<Cell>>,
}

impl ExportDocument {
    /// Buffer one row per record, keeping input order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(records: &[ChatRecord]) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    Cell::Number(r.id as f64),
                    Cell::text(&r.scope_id),
                    Cell::text(&r.user_id),
                    Cell::text(&r.username),
                    Cell::text(&r.content),
                    Cell::text(&r.time),
                ]
            })
            .collect();

        Self { rows }
    }

    /// Header labels in column order.
    #[must_use]
    pub fn header() -> Vec<&'static str> {
        COLUMNS.iter().map(|(name, _)| *name).collect()
    }

    /// Data rows, excluding the header.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Write the document as an `.xlsx` workbook at `path`.
    ///
    /// # Errors
    /// Returns error if the workbook cannot be built or saved.
    pub fn write_xlsx(&self, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, (header, width)) in (0u16..).zip(COLUMNS) {
            worksheet.set_column_width(col, width)?;
            worksheet.write_string(0, col, header)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let row_num =
                u32::try_from(index + 1).map_err(|_| ExportError::TooManyRows(self.rows.len()))?;
            for (col, cell) in (0u16..).zip(row) {
                match cell {
                    Cell::Number(n) => worksheet.write_number(row_num, col, *n)?,
                    Cell::Text(s) => worksheet.write_string(row_num, col, s)?,
                };
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

/// Filename for an export written at `now`.
///
/// Fields are not zero-padded: January 5th at 08:03:09 gives
/// `chat_logs_2024-1-5-8-3-9.xlsx`.
#[must_use]
pub fn export_filename(now: NaiveDateTime) -> String {
    format!(
        "chat_logs_{}-{}-{}-{}-{}-{}.xlsx",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Resolve the output directory, defaulting to the working directory.
fn resolve_directory(directory: Option<&Path>) -> PathBuf {
    match directory {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Export records to a spreadsheet named after the current local time.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn export(records: &[ChatRecord], directory: Option<&Path>) -> Result<PathBuf, ExportError> {
    export_at(records, directory, Local::now().naive_local())
}

/// Export records to a spreadsheet named after `now`.
///
/// An existing file with the same name is overwritten.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn export_at(
    records: &[ChatRecord],
    directory: Option<&Path>,
    now: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let path = resolve_directory(directory).join(export_filename(now));
    let document = ExportDocument::from_records(records);

    document.write_xlsx(&path)?;

    tracing::debug!(path = %path.display(), rows = records.len(), "Wrote export workbook");
    Ok(path)
}
