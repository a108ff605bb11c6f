// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for sheetflow.
//!
//! This crate provides the error type, the domain records parsed from the
//! spreadsheet-backed configuration, and the collaborator traits (sheet
//! source, chat history, completion service) that the rest of the
//! workspace is written against.

pub mod error;
pub mod range;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SheetflowError;
pub use range::{A1Range, CellRef};
pub use types::{
    AdapterType, ChatMessage, ChatRole, FlowRecord, HealthStatus, PromptSettings, Resource,
    ScheduledMessage, SettingValue,
};

pub use traits::{
    ChatHistory, CompletionRequest, CompletionService, MessageSink, PluginAdapter, Row,
    SheetSource,
};
