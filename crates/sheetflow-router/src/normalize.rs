// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization shared by messages and flow keywords.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reduce text to its canonical comparable form.
///
/// Lowercases, decomposes accented letters (NFD) and drops the combining
/// marks, drops everything outside `[a-z0-9]` and whitespace, then trims and
/// collapses whitespace runs to a single space. Total and idempotent.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
