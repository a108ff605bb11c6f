// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory sheet source for store and dispatcher tests.
//!
//! Each sheet is registered with the sheet row its data starts at, so
//! `write_cell("F5")` lands on the right row. `fetch_range` ignores the
//! requested range and returns the registered rows.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use sheetflow_core::{
    AdapterType, CellRef, HealthStatus, PluginAdapter, Row, SheetSource, SheetflowError,
};

#[derive(Debug, Clone, Default)]
struct MockSheet {
    first_row: u32,
    rows: Vec<Row>,
}

/// A recorded `write_cell` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub sheet: String,
    pub cell: String,
    pub value: String,
}

/// In-memory [`SheetSource`] with observable side effects.
#[derive(Default)]
pub struct MockSheetSource {
    sheets: Mutex<HashMap<String, MockSheet>>,
    fetches: Mutex<HashMap<String, usize>>,
    writes: Mutex<Vec<CellWrite>>,
    appends: Mutex<Vec<(String, Row)>>,
    fail_fetch: AtomicBool,
    fetch_error: Mutex<Option<String>>,
    missing: Mutex<HashSet<String>>,
    fail_write: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
}

impl MockSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a sheet whose first data row is `first_row`.
    pub fn set_sheet(&self, sheet: &str, first_row: u32, rows: Vec<Row>) {
        self.sheets
            .lock()
            .unwrap()
            .insert(sheet.to_string(), MockSheet { first_row, rows });
    }

    /// Replaces the rows of an existing sheet, keeping its first row.
    pub fn set_rows(&self, sheet: &str, rows: Vec<Row>) {
        let mut sheets = self.sheets.lock().unwrap();
        let entry = sheets.entry(sheet.to_string()).or_insert(MockSheet {
            first_row: 2,
            rows: Vec::new(),
        });
        entry.rows = rows;
    }

    pub fn rows(&self, sheet: &str) -> Vec<Row> {
        self.sheets
            .lock()
            .unwrap()
            .get(sheet)
            .map(|s| s.rows.clone())
            .unwrap_or_default()
    }

    /// Number of `fetch_range` calls that reached this sheet.
    pub fn fetch_count(&self, sheet: &str) -> usize {
        self.fetches.lock().unwrap().get(sheet).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<CellWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn appends(&self) -> Vec<(String, Row)> {
        self.appends.lock().unwrap().clone()
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes every fetch fail as unavailable with the given message.
    pub fn set_fetch_error(&self, message: Option<&str>) {
        *self.fetch_error.lock().unwrap() = message.map(str::to_string);
    }

    /// Reports `sheet` as absent from the workbook on fetch.
    pub fn set_missing(&self, sheet: &str) {
        self.missing.lock().unwrap().insert(sheet.to_string());
    }

    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Makes every fetch sleep first (tokio time, so paused clocks apply).
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl PluginAdapter for MockSheetSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SheetSource for MockSheetSource {
    async fn fetch_range(&self, sheet: &str, _range: &str) -> Result<Vec<Row>, SheetflowError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(sheet.to_string())
            .or_default() += 1;

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SheetflowError::source_unavailable("mock fetch failure"));
        }
        let fetch_error = self.fetch_error.lock().unwrap().clone();
        if let Some(message) = fetch_error {
            return Err(SheetflowError::source_unavailable(message));
        }
        if self.missing.lock().unwrap().contains(sheet) {
            return Err(SheetflowError::SheetNotFound {
                sheet: sheet.to_string(),
            });
        }

        Ok(self.rows(sheet))
    }

    async fn write_cell(&self, sheet: &str, cell: &str, value: &str) -> Result<(), SheetflowError> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(SheetflowError::write_failed("mock write failure"));
        }

        let cell_ref: CellRef = cell.parse()?;
        let row_number = cell_ref
            .row
            .ok_or_else(|| SheetflowError::write_failed(format!("`{cell}` has no row")))?;

        let mut sheets = self.sheets.lock().unwrap();
        let sheet_data = sheets
            .get_mut(sheet)
            .ok_or_else(|| SheetflowError::write_failed(format!("no sheet `{sheet}`")))?;
        let index = row_number
            .checked_sub(sheet_data.first_row)
            .ok_or_else(|| SheetflowError::write_failed(format!("`{cell}` is above the data")))?
            as usize;
        if sheet_data.rows.len() <= index {
            sheet_data.rows.resize(index + 1, Vec::new());
        }
        let row = &mut sheet_data.rows[index];
        let column = cell_ref.column as usize;
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        row[column] = value.to_string();
        drop(sheets);

        self.writes.lock().unwrap().push(CellWrite {
            sheet: sheet.to_string(),
            cell: cell.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn append_row(
        &self,
        sheet: &str,
        _range: &str,
        values: Vec<String>,
    ) -> Result<(), SheetflowError> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(SheetflowError::write_failed("mock append failure"));
        }
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet.to_string())
            .or_insert(MockSheet {
                first_row: 2,
                rows: Vec::new(),
            })
            .rows
            .push(values.clone());
        self.appends.lock().unwrap().push((sheet.to_string(), values));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[tokio::test]
    async fn write_cell_updates_row_relative_to_first_row() {
        let source = MockSheetSource::new();
        source.set_sheet("scheduled", 2, vec![row(&["a"]), row(&["b"])]);

        source.write_cell("scheduled", "C3", "done").await.unwrap();

        assert_eq!(source.rows("scheduled")[1], row(&["b", "", "done"]));
        assert_eq!(source.writes().len(), 1);
    }

    #[tokio::test]
    async fn failure_switches_apply() {
        let source = MockSheetSource::new();
        source.set_sheet("flows", 2, vec![row(&["hola"])]);

        source.set_fail_fetch(true);
        assert!(source.fetch_range("flows", "A2:C").await.is_err());
        assert_eq!(source.fetch_count("flows"), 1);

        source.set_fail_write(true);
        assert!(source.write_cell("flows", "B2", "x").await.is_err());
        assert!(source.writes().is_empty());
    }
}
