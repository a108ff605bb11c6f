// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat history providers.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use sheetflow_config::model::SheetflowConfig;
use sheetflow_core::{
    AdapterType, ChatHistory, ChatMessage, ChatRole, HealthStatus, PluginAdapter, SheetSource,
    SheetflowError,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Conversations kept by [`InMemoryHistory`] before the least recently
/// active one is evicted.
pub const DEFAULT_MAX_CONVERSATIONS: usize = 1024;

#[derive(Default)]
struct Conversation {
    last_active: u64,
    messages: VecDeque<ChatMessage>,
}

#[derive(Default)]
struct Conversations {
    clock: u64,
    by_id: HashMap<String, Conversation>,
}

/// Process-local history, bounded per conversation and in the number of
/// conversations it remembers.
pub struct InMemoryHistory {
    max_messages: usize,
    max_conversations: usize,
    conversations: Mutex<Conversations>,
}

impl InMemoryHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            conversations: Mutex::new(Conversations::default()),
        }
    }

    /// Caps how many conversations are remembered at once.
    pub fn with_max_conversations(mut self, max_conversations: usize) -> Self {
        self.max_conversations = max_conversations.max(1);
        self
    }
}

#[async_trait]
impl PluginAdapter for InMemoryHistory {
    fn name(&self) -> &str {
        "memory-history"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ChatHistory for InMemoryHistory {
    async fn get_context(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, SheetflowError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations
            .by_id
            .get(conversation_id)
            .map(|conversation| conversation.messages.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), SheetflowError> {
        let mut conversations = self.conversations.lock().await;
        conversations.clock += 1;
        let now = conversations.clock;

        if !conversations.by_id.contains_key(conversation_id)
            && conversations.by_id.len() >= self.max_conversations
        {
            let idle = conversations
                .by_id
                .iter()
                .min_by_key(|(_, conversation)| conversation.last_active)
                .map(|(id, _)| id.clone());
            if let Some(idle) = idle {
                debug!(conversation_id = %idle, "evicting idle conversation");
                conversations.by_id.remove(&idle);
            }
        }

        let conversation = conversations
            .by_id
            .entry(conversation_id.to_string())
            .or_default();
        conversation.last_active = now;
        conversation.messages.push_back(ChatMessage::new(role, content));
        while conversation.messages.len() > self.max_messages {
            conversation.messages.pop_front();
        }
        Ok(())
    }
}

/// History persisted as rows of `[timestamp, conversation, role, content]`
/// on a sheet of the workbook.
pub struct SheetHistory {
    source: Arc<dyn SheetSource>,
    sheet: String,
    range: String,
    max_messages: usize,
}

impl SheetHistory {
    pub fn new(
        source: Arc<dyn SheetSource>,
        sheet: impl Into<String>,
        range: impl Into<String>,
        max_messages: usize,
    ) -> Self {
        Self {
            source,
            sheet: sheet.into(),
            range: range.into(),
            max_messages: max_messages.max(1),
        }
    }
}

/// Picks the history provider the configuration asks for.
pub fn history_from_config(
    source: Arc<dyn SheetSource>,
    config: &SheetflowConfig,
) -> Arc<dyn ChatHistory> {
    let max = config.history.max_context_messages;
    match &config.sheets.history_sheet {
        Some(sheet) => Arc::new(SheetHistory::new(
            source,
            sheet.clone(),
            config.sheets.history_range.clone(),
            max,
        )),
        None => Arc::new(InMemoryHistory::new(max)),
    }
}

fn history_error(err: SheetflowError) -> SheetflowError {
    SheetflowError::History {
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl PluginAdapter for SheetHistory {
    fn name(&self) -> &str {
        "sheet-history"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::History
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        self.source.health_check().await
    }
}

#[async_trait]
impl ChatHistory for SheetHistory {
    async fn get_context(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, SheetflowError> {
        let rows = match self.source.fetch_range(&self.sheet, &self.range).await {
            Ok(rows) => rows,
            // A history sheet that does not exist yet is an empty history.
            Err(SheetflowError::SheetNotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(history_error(e)),
        };

        let mut messages: Vec<ChatMessage> = rows
            .iter()
            .filter(|row| row.get(1).is_some_and(|id| id == conversation_id))
            .filter_map(|row| {
                let role = row.get(2)?;
                match role.parse::<ChatRole>() {
                    Ok(role) => Some(ChatMessage::new(
                        role,
                        row.get(3).cloned().unwrap_or_default(),
                    )),
                    Err(_) => {
                        warn!(
                            sheet = %self.sheet,
                            role = %role,
                            "skipping history row with unknown role"
                        );
                        None
                    }
                }
            })
            .collect();

        if messages.len() > self.max_messages {
            messages.drain(..messages.len() - self.max_messages);
        }
        debug!(conversation_id, messages = messages.len(), "history loaded");
        Ok(messages)
    }

    async fn save_message(
        &self,
        conversation_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<(), SheetflowError> {
        let row = vec![
            chrono::Utc::now().to_rfc3339(),
            conversation_id.to_string(),
            role.to_string(),
            content.to_string(),
        ];
        self.source
            .append_row(&self.sheet, &self.range, row)
            .await
            .map_err(history_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetflow_test_utils::{MockSheetSource, row};

    #[tokio::test]
    async fn in_memory_history_keeps_last_messages_per_conversation() {
        let history = InMemoryHistory::new(2);
        history.save_message("a", ChatRole::User, "uno").await.unwrap();
        history.save_message("a", ChatRole::Assistant, "dos").await.unwrap();
        history.save_message("a", ChatRole::User, "tres").await.unwrap();
        history.save_message("b", ChatRole::User, "otro").await.unwrap();

        let context = history.get_context("a").await.unwrap();
        assert_eq!(
            context,
            vec![
                ChatMessage::new(ChatRole::Assistant, "dos"),
                ChatMessage::new(ChatRole::User, "tres"),
            ]
        );
        assert_eq!(history.get_context("b").await.unwrap().len(), 1);
        assert!(history.get_context("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn in_memory_history_evicts_least_recently_active_conversation() {
        let history = InMemoryHistory::new(4).with_max_conversations(2);
        history.save_message("a", ChatRole::User, "uno").await.unwrap();
        history.save_message("b", ChatRole::User, "dos").await.unwrap();
        history.save_message("a", ChatRole::User, "tres").await.unwrap();
        history.save_message("c", ChatRole::User, "cuatro").await.unwrap();

        assert!(history.get_context("b").await.unwrap().is_empty());
        assert_eq!(history.get_context("a").await.unwrap().len(), 2);
        assert_eq!(history.get_context("c").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sheet_history_treats_missing_sheet_as_empty() {
        let source = Arc::new(MockSheetSource::new());
        source.set_missing("history");
        let history = SheetHistory::new(source, "history", "A2:D", 10);

        assert!(history.get_context("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sheet_history_propagates_other_source_errors() {
        let source = Arc::new(MockSheetSource::new());
        source.set_fetch_error(Some("service account key file not found"));
        let history = SheetHistory::new(source, "history", "A2:D", 10);

        let err = history.get_context("c").await.unwrap_err();
        assert!(
            matches!(&err, SheetflowError::History { message, .. } if message.contains("key file")),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn sheet_history_appends_and_filters_by_conversation() {
        let source = Arc::new(MockSheetSource::new());
        source.set_sheet(
            "history",
            2,
            vec![
                row(&["t0", "other", "user", "no"]),
                row(&["t1", "5215550001", "user", "hola"]),
                row(&["t2", "5215550001", "robot", "???"]),
            ],
        );
        let history = SheetHistory::new(source.clone(), "history", "A2:D", 10);

        history
            .save_message("5215550001", ChatRole::Assistant, "¡Hola!")
            .await
            .unwrap();

        let appended = source.appends();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].0, "history");
        assert_eq!(appended[0].1[1..], ["5215550001", "assistant", "¡Hola!"]);

        let context = history.get_context("5215550001").await.unwrap();
        assert_eq!(
            context,
            vec![
                ChatMessage::new(ChatRole::User, "hola"),
                ChatMessage::new(ChatRole::Assistant, "¡Hola!"),
            ]
        );
    }

    #[tokio::test]
    async fn sheet_history_bounds_context() {
        let source = Arc::new(MockSheetSource::new());
        let rows = (0..5)
            .map(|i| row(&["t", "c", "user", &format!("m{i}")]))
            .collect();
        source.set_sheet("history", 2, rows);
        let history = SheetHistory::new(source, "history", "A2:D", 2);

        let context = history.get_context("c").await.unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].content, "m3");
    }

    #[tokio::test]
    async fn sheet_history_failures_are_history_errors() {
        let source = Arc::new(MockSheetSource::new());
        source.set_fail_fetch(true);
        source.set_fail_write(true);
        let history = SheetHistory::new(source, "history", "A2:D", 10);

        assert!(matches!(
            history.get_context("c").await.unwrap_err(),
            SheetflowError::History { .. }
        ));
        assert!(matches!(
            history.save_message("c", ChatRole::User, "x").await.unwrap_err(),
            SheetflowError::History { .. }
        ));
    }
}
