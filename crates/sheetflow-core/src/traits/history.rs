// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat history trait for transcript persistence.

use async_trait::async_trait;

use crate::error::SheetflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatMessage, ChatRole};

/// Adapter for conversation transcripts consumed by the response path.
#[async_trait]
pub trait ChatHistory: PluginAdapter {
    /// Returns the recent context for a conversation, oldest first.
    async fn get_context(&self, conversation_id: &str)
        -> Result<Vec<ChatMessage>, SheetflowError>;

    /// Appends one message to a conversation.
    async fn save_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), SheetflowError>;
}
