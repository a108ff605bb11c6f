// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV workbook sheet source for sheetflow.
//!
//! A workbook is a directory holding one `<sheet>.csv` file per sheet.
//! Sheet row 1 is CSV record 1; there is no header handling, so header rows
//! are skipped by starting ranges at row 2.

pub mod workbook;

pub use workbook::CsvWorkbook;
