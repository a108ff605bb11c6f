// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-to-flow routing for sheetflow.
//!
//! This crate provides:
//! - [`normalize`]: reduces raw text to a comparable `[a-z0-9 ]` form
//! - [`match_flow`]: tiered (exact, whole-word, substring) keyword matching
//!   over an ordered flow table, first match wins
//!
//! Both are pure and allocation-light; the flow table itself comes from the
//! configuration store.

pub mod matcher;
pub mod normalize;

pub use matcher::{FlowMatch, MatchTier, match_flow};
pub use normalize::normalize;
