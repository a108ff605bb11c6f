// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod completion;
pub mod history;
pub mod sink;
pub mod source;

pub use adapter::PluginAdapter;
pub use completion::{CompletionRequest, CompletionService};
pub use history::ChatHistory;
pub use sink::MessageSink;
pub use source::{Row, SheetSource};
