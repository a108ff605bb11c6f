// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion service trait for LLM integrations.

use async_trait::async_trait;

use crate::error::SheetflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ChatMessage;

/// A request to a completion service.
///
/// `None` fields fall back to the service's configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Adapter for opaque text completion backends.
#[async_trait]
pub trait CompletionService: PluginAdapter {
    /// Generates a reply for the given message list.
    async fn generate(&self, request: CompletionRequest) -> Result<String, SheetflowError>;
}
