// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The request path that sits above the configuration store.
//!
//! - [`Responder`]: scripted flow replies first, the completion service
//!   otherwise, a configured apology when that fails
//! - [`InMemoryHistory`] / [`SheetHistory`]: chat history providers
//! - [`Dispatcher`]: sends due scheduled messages and records their status

pub mod dispatch;
pub mod history;
pub mod responder;

pub use dispatch::{DispatchReport, Dispatcher};
pub use history::{InMemoryHistory, SheetHistory, history_from_config};
pub use responder::{Reply, Responder};
