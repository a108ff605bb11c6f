// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached access to the spreadsheet-backed bot configuration.
//!
//! - [`TtlCache`]: one resource, a fixed freshness window, explicit
//!   invalidation, single-flight refresh
//! - [`ConfigStore`]: three caches (flows, prompt settings, scheduled
//!   messages) over one [`sheetflow_core::SheetSource`], plus the status
//!   write that evicts only the scheduled-message cache
//! - [`rows`]: positional parsing of each resource's sheet rows
//! - [`settings`]: numeric coercion of prompt settings and the
//!   load-once guard used by long-lived callers

pub mod cache;
pub mod rows;
pub mod settings;
pub mod store;

pub use cache::TtlCache;
pub use settings::{SettingsOnce, coerce_value, resolve_settings};
pub use store::ConfigStore;
