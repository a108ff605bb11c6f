// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for sheetflow.
//!
//! Provides mock collaborators for deterministic, offline testing:
//! - [`MockSheetSource`]: in-memory sheets with call counters and failure switches
//! - [`MockCompletion`]: pre-configured completion responses with request capture
//! - [`RecordingSink`]: captures outbound deliveries

pub mod mock_completion;
pub mod mock_sink;
pub mod mock_source;

pub use mock_completion::MockCompletion;
pub use mock_sink::{Delivery, RecordingSink};
pub use mock_source::MockSheetSource;

/// Builds a row from string literals.
pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
