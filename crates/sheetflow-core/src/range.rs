// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A1-notation cell references and ranges (`F7`, `A2:C`, `A1:C10`).

use std::fmt;
use std::str::FromStr;

use crate::error::SheetflowError;

/// A cell reference with a 0-based column and an optional 1-based row.
///
/// A missing row (`C`) means "unbounded" when used as a range end and
/// "row 1" when used as a range start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: u32,
    pub row: Option<u32>,
}

impl CellRef {
    pub fn new(column: u32, row: u32) -> Self {
        Self {
            column,
            row: Some(row),
        }
    }
}

impl FromStr for CellRef {
    type Err = SheetflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(SheetflowError::Config(format!(
                "cell reference `{s}` has no column letters"
            )));
        }

        let mut column: u32 = 0;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            column = column
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(|| {
                    SheetflowError::Config(format!("column `{letters}` is out of range"))
                })?;
        }

        let row = if digits.is_empty() {
            None
        } else {
            let row: u32 = digits.parse().map_err(|_| {
                SheetflowError::Config(format!("cell reference `{s}` has an invalid row"))
            })?;
            if row == 0 {
                return Err(SheetflowError::Config(format!(
                    "cell reference `{s}` has row 0; rows start at 1"
                )));
            }
            Some(row)
        };

        Ok(Self {
            column: column - 1,
            row,
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&column_letters(self.column))?;
        if let Some(row) = self.row {
            write!(f, "{row}")?;
        }
        Ok(())
    }
}

/// A rectangular A1 range. A single cell parses as a one-cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct A1Range {
    pub start: CellRef,
    pub end: CellRef,
}

impl A1Range {
    /// First row covered, 1-based.
    pub fn first_row(&self) -> u32 {
        self.start.row.unwrap_or(1)
    }

    /// Last row covered, or `None` when the range is open-ended.
    pub fn last_row(&self) -> Option<u32> {
        self.end.row
    }

    pub fn first_column(&self) -> u32 {
        self.start.column
    }

    pub fn last_column(&self) -> u32 {
        self.end.column
    }

    pub fn width(&self) -> usize {
        (self.end.column - self.start.column + 1) as usize
    }
}

impl FromStr for A1Range {
    type Err = SheetflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = match s.split_once(':') {
            Some((a, b)) => (a.parse::<CellRef>()?, b.parse::<CellRef>()?),
            None => {
                let cell = s.parse::<CellRef>()?;
                (cell, cell)
            }
        };

        if end.column < start.column {
            return Err(SheetflowError::Config(format!(
                "range `{s}` ends before it starts"
            )));
        }
        if let (Some(a), Some(b)) = (start.row, end.row)
            && b < a
        {
            return Err(SheetflowError::Config(format!(
                "range `{s}` ends before it starts"
            )));
        }

        Ok(Self { start, end })
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Converts a 0-based column index to its letters (`0` -> `A`, `26` -> `AA`).
pub fn column_letters(index: u32) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}
