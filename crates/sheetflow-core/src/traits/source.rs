// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source data provider trait for spreadsheet-style backends.

use async_trait::async_trait;

use crate::error::SheetflowError;
use crate::traits::adapter::PluginAdapter;

/// A single sheet row. Trailing empty cells may be omitted, so rows can be
/// shorter than the requested range.
pub type Row = Vec<String>;

/// Adapter for tabular configuration sources.
///
/// Ranges and cell references use A1 notation (`A2:C`, `F7`). Failures are
/// reported as errors and never panic; callers degrade gracefully.
#[async_trait]
pub trait SheetSource: PluginAdapter {
    /// Reads every row of `range` on `sheet`, in sheet order.
    async fn fetch_range(&self, sheet: &str, range: &str) -> Result<Vec<Row>, SheetflowError>;

    /// Writes a single cell.
    async fn write_cell(&self, sheet: &str, cell: &str, value: &str)
        -> Result<(), SheetflowError>;

    /// Appends one row after the last populated row of `range`.
    async fn append_row(
        &self,
        sheet: &str,
        range: &str,
        values: Vec<String>,
    ) -> Result<(), SheetflowError>;
}
