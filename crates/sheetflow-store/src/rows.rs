// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Positional row parsing for the three configuration sheets.
//!
//! Rows may be shorter than the range they came from. A missing or blank
//! cell is `None`, never an empty string and never an error.

use std::collections::BTreeMap;

use sheetflow_core::{FlowRecord, PromptSettings, Row, ScheduledMessage};

/// Returns the cell at `index` unless it is missing or blank.
fn cell(row: &Row, index: usize) -> Option<String> {
    row.get(index)
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

/// Columns: keywords, answer, media. Table order is preserved.
pub fn parse_flow_rows(rows: &[Row]) -> Vec<FlowRecord> {
    rows.iter()
        .map(|row| FlowRecord {
            keywords: cell(row, 0).unwrap_or_default(),
            answer: cell(row, 1),
            media: cell(row, 2),
        })
        .collect()
}

/// Builds the raw prompt mapping.
///
/// The first row's first cell seeds `system_prompt`. Each following row
/// contributes `row[1] -> row[2]` when both are present; duplicate keys
/// resolve last-write-wins in sheet order.
pub fn parse_prompt_rows(rows: &[Row]) -> BTreeMap<String, String> {
    let mut raw = BTreeMap::new();

    let Some((first, rest)) = rows.split_first() else {
        return raw;
    };

    if let Some(prompt) = cell(first, 0) {
        raw.insert(PromptSettings::SYSTEM_PROMPT.to_string(), prompt);
    }

    for row in rest {
        if let (Some(key), Some(value)) = (cell(row, 1), cell(row, 2)) {
            raw.insert(key.trim().to_string(), value);
        }
    }

    raw
}

/// Columns: date, time, phone, answer, media, status.
///
/// `first_row` is the sheet row the fetched range starts at, so each
/// record's `row_index` addresses its own status cell.
pub fn parse_scheduled_rows(rows: &[Row], first_row: u32) -> Vec<ScheduledMessage> {
    rows.iter()
        .enumerate()
        .map(|(offset, row)| ScheduledMessage {
            row_index: first_row + offset as u32,
            date: cell(row, 0),
            time: cell(row, 1),
            phone: cell(row, 2),
            answer: cell(row, 3),
            media: cell(row, 4),
            status: cell(row, 5),
        })
        .collect()
}
