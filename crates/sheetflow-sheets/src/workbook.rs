// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-of-CSV-files implementation of [`SheetSource`].
//!
//! Reads return exactly what a hosted spreadsheet API would: trailing empty
//! cells are dropped from each row and trailing empty rows from the range,
//! so short rows reach the store as short rows.
//!
//! All writes go through one async mutex per workbook and replace the sheet
//! file by rename, so readers never observe a half-written sheet. Written
//! sheets are padded to a rectangular grid; the `csv` reader skips blank
//! lines, and padding keeps an empty row from collapsing into one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use sheetflow_config::model::SheetsConfig;
use sheetflow_core::{
    A1Range, AdapterType, CellRef, HealthStatus, PluginAdapter, Row, SheetSource, SheetflowError,
};

/// A workbook stored as one `<sheet>.csv` file per sheet.
pub struct CsvWorkbook {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvWorkbook {
    /// Opens the workbook at `dir`.
    ///
    /// A missing directory is a [`SheetflowError::Credentials`] error: the
    /// store cannot be built without its source, so this is fatal at startup.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SheetflowError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(SheetflowError::Credentials(format!(
                "workbook directory `{}` does not exist",
                dir.display()
            )));
        }
        info!(dir = %dir.display(), "workbook opened");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn from_config(sheets: &SheetsConfig) -> Result<Self, SheetflowError> {
        Self::open(&sheets.workbook_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn sheet_path(&self, sheet: &str) -> Result<PathBuf, SheetflowError> {
        if sheet.is_empty() || sheet.contains(['/', '\\']) || sheet.starts_with('.') {
            return Err(SheetflowError::Config(format!(
                "`{sheet}` is not a valid sheet name"
            )));
        }
        Ok(self.dir.join(format!("{sheet}.csv")))
    }
}

#[async_trait]
impl PluginAdapter for CsvWorkbook {
    fn name(&self) -> &str {
        "csv-workbook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        if self.dir.is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!(
                "workbook directory `{}` is gone",
                self.dir.display()
            )))
        }
    }
}

#[async_trait]
impl SheetSource for CsvWorkbook {
    async fn fetch_range(&self, sheet: &str, range: &str) -> Result<Vec<Row>, SheetflowError> {
        let range: A1Range = range.parse()?;
        let path = self.sheet_path(sheet)?;

        let rows = blocking(move || read_sheet(&path))
            .await?
            .ok_or_else(|| SheetflowError::SheetNotFound {
                sheet: sheet.to_string(),
            })?;

        let rows = slice(&rows, &range);
        debug!(sheet, %range, rows = rows.len(), "range read");
        Ok(rows)
    }

    async fn write_cell(&self, sheet: &str, cell: &str, value: &str) -> Result<(), SheetflowError> {
        let cell_ref: CellRef = cell.parse()?;
        let row = cell_ref.row.ok_or_else(|| {
            SheetflowError::Config(format!("cell reference `{cell}` has no row"))
        })?;
        let path = self.sheet_path(sheet)?;
        let missing = format!("sheet `{sheet}` not found in workbook");
        let value = value.to_string();

        let _guard = self.write_lock.lock().await;
        blocking(move || {
            let mut rows = read_sheet(&path)
                .map_err(as_write_error)?
                .ok_or_else(|| SheetflowError::write_failed(missing))?;
            set_cell(
                &mut rows,
                (row - 1) as usize,
                cell_ref.column as usize,
                value,
            );
            write_sheet(&path, &rows)
        })
        .await?;

        debug!(sheet, cell, "cell written");
        Ok(())
    }

    async fn append_row(
        &self,
        sheet: &str,
        range: &str,
        values: Vec<String>,
    ) -> Result<(), SheetflowError> {
        let range: A1Range = range.parse()?;
        let path = self.sheet_path(sheet)?;

        let _guard = self.write_lock.lock().await;
        let row = blocking(move || {
            let mut rows = read_sheet(&path).map_err(as_write_error)?.unwrap_or_default();
            let target = next_free_row(&rows, &range);
            let first_column = range.first_column() as usize;
            for (offset, value) in values.into_iter().enumerate() {
                set_cell(&mut rows, target, first_column + offset, value);
            }
            write_sheet(&path, &rows)?;
            Ok(target + 1)
        })
        .await?;

        debug!(sheet, row, "row appended");
        Ok(())
    }
}

/// Runs blocking file I/O off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, SheetflowError>
where
    F: FnOnce() -> Result<T, SheetflowError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SheetflowError::Internal(format!("workbook task failed: {e}")))?
}

/// Reads every record of a sheet file. `None` when the file does not exist.
fn read_sheet(path: &Path) -> Result<Option<Vec<Row>>, SheetflowError> {
    if !path.exists() {
        return Ok(None);
    }

    let read_error = |e: csv::Error| SheetflowError::Source {
        message: format!("cannot read `{}`", path.display()),
        source: Some(Box::new(e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_error)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Some(rows))
}

/// Replaces a sheet file with `rows`, padded to the widest row.
fn write_sheet(path: &Path, rows: &[Row]) -> Result<(), SheetflowError> {
    let write_error = |e: csv::Error| SheetflowError::Write {
        message: format!("cannot write `{}`", path.display()),
        source: Some(Box::new(e)),
    };

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(2);
    let staging = path.with_extension("csv.tmp");

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&staging)
        .map_err(write_error)?;
    for row in rows {
        let padding = std::iter::repeat_n("", width - row.len());
        writer
            .write_record(row.iter().map(String::as_str).chain(padding))
            .map_err(write_error)?;
    }
    writer.flush().map_err(|e| SheetflowError::Write {
        message: format!("cannot flush `{}`", staging.display()),
        source: Some(Box::new(e)),
    })?;
    drop(writer);

    std::fs::rename(&staging, path).map_err(|e| SheetflowError::Write {
        message: format!("cannot replace `{}`", path.display()),
        source: Some(Box::new(e)),
    })
}

fn as_write_error(err: SheetflowError) -> SheetflowError {
    match err {
        SheetflowError::Source { message, source } => SheetflowError::Write { message, source },
        other => other,
    }
}

/// Cuts `range` out of a sheet, trimming trailing empty cells and rows.
fn slice(rows: &[Row], range: &A1Range) -> Vec<Row> {
    let start = (range.first_row() - 1) as usize;
    let end = range
        .last_row()
        .map_or(rows.len(), |last| last as usize)
        .min(rows.len());
    if start >= end {
        return Vec::new();
    }

    let mut out: Vec<Row> = rows[start..end]
        .iter()
        .map(|row| {
            let mut cells: Row = row
                .iter()
                .skip(range.first_column() as usize)
                .take(range.width())
                .cloned()
                .collect();
            while cells.last().is_some_and(String::is_empty) {
                cells.pop();
            }
            cells
        })
        .collect();

    while out.last().is_some_and(Vec::is_empty) {
        out.pop();
    }
    out
}

/// 0-based index of the row after the last row with content in `range`.
fn next_free_row(rows: &[Row], range: &A1Range) -> usize {
    let first = (range.first_row() - 1) as usize;
    let columns = range.first_column() as usize..=range.last_column() as usize;

    rows.iter()
        .enumerate()
        .skip(first)
        .filter(|(_, row)| {
            row.iter()
                .enumerate()
                .any(|(col, cell)| columns.contains(&col) && !cell.is_empty())
        })
        .map(|(index, _)| index + 1)
        .last()
        .unwrap_or(first)
}

fn set_cell(rows: &mut Vec<Row>, row: usize, column: usize, value: String) {
    if rows.len() <= row {
        rows.resize(row + 1, Vec::new());
    }
    let cells = &mut rows[row];
    if cells.len() <= column {
        cells.resize(column + 1, String::new());
    }
    cells[column] = value;
}
