// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns one inbound message into one reply.
//!
//! Order of resolution:
//! 1. A matching flow with an answer or media replies without calling the
//!    completion service.
//! 2. Otherwise the completion service is asked, with the sheet's system
//!    prompt, recent history, and the sheet's sampling settings.
//! 3. If that fails, the configured fallback text is returned.

use std::sync::Arc;

use sheetflow_core::{ChatHistory, ChatMessage, ChatRole, CompletionRequest, CompletionService};
use sheetflow_router::{MatchTier, match_flow};
use sheetflow_store::{ConfigStore, SettingsOnce};
use tracing::{debug, info, warn};

/// Setting keys read from the prompts sheet.
const MODEL_KEY: &str = "model";
const TEMPERATURE_KEY: &str = "temperature";
const MAX_TOKENS_KEY: &str = "max_tokens";

/// What the bot sends back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A scripted reply from the flows sheet.
    Flow {
        answer: Option<String>,
        media: Option<String>,
        keyword: String,
        tier: MatchTier,
    },
    /// Text produced by the completion service.
    Generated { text: String },
    /// The configured apology, used when generation failed.
    Fallback { text: String },
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Flow { answer, .. } => answer.as_deref(),
            Reply::Generated { text } | Reply::Fallback { text } => Some(text),
        }
    }

    pub fn media(&self) -> Option<&str> {
        match self {
            Reply::Flow { media, .. } => media.as_deref(),
            _ => None,
        }
    }
}

pub struct Responder {
    store: Arc<ConfigStore>,
    completion: Arc<dyn CompletionService>,
    history: Arc<dyn ChatHistory>,
    settings: SettingsOnce,
    fallback_reply: String,
}

impl Responder {
    pub fn new(
        store: Arc<ConfigStore>,
        completion: Arc<dyn CompletionService>,
        history: Arc<dyn ChatHistory>,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            store,
            completion,
            history,
            settings: SettingsOnce::new(),
            fallback_reply: fallback_reply.into(),
        }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Produces the reply for `text` in conversation `conversation_id`.
    ///
    /// Never fails: collaborator errors are logged and degrade to the
    /// fallback reply.
    pub async fn reply(&self, conversation_id: &str, text: &str) -> Reply {
        let flows = self.store.flows().await;

        if let Some(found) = match_flow(text, &flows)
            && found.flow.has_reply()
        {
            info!(
                conversation_id,
                flow = found.index,
                keyword = %found.keyword,
                tier = %found.tier,
                "flow matched"
            );
            let reply = Reply::Flow {
                answer: found.flow.answer.clone(),
                media: found.flow.media.clone(),
                keyword: found.keyword.clone(),
                tier: found.tier,
            };
            self.record(conversation_id, ChatRole::User, text).await;
            let transcript = reply.text().or(reply.media()).unwrap_or_default();
            self.record(conversation_id, ChatRole::Assistant, transcript)
                .await;
            return reply;
        }

        self.generate(conversation_id, text).await
    }

    async fn generate(&self, conversation_id: &str, text: &str) -> Reply {
        let settings = self.settings.get_or_load(&self.store).await;

        let context = match self.history.get_context(conversation_id).await {
            Ok(context) => context,
            Err(e) => {
                warn!(conversation_id, error = %e, "history unavailable, replying without context");
                Vec::new()
            }
        };

        let mut messages = Vec::with_capacity(context.len() + 2);
        if let Some(prompt) = settings.system_prompt() {
            messages.push(ChatMessage::new(ChatRole::System, prompt));
        }
        messages.extend(context);
        messages.push(ChatMessage::new(ChatRole::User, text));

        let request = CompletionRequest {
            messages,
            model: settings.text(MODEL_KEY).map(str::to_string),
            temperature: settings.number(TEMPERATURE_KEY),
            max_tokens: settings.number(MAX_TOKENS_KEY).and_then(token_count),
        };
        debug!(
            conversation_id,
            messages = request.messages.len(),
            "requesting completion"
        );

        self.record(conversation_id, ChatRole::User, text).await;

        match self.completion.generate(request).await {
            Ok(generated) => {
                self.record(conversation_id, ChatRole::Assistant, &generated)
                    .await;
                Reply::Generated { text: generated }
            }
            Err(e) => {
                warn!(conversation_id, error = %e, "completion failed, sending fallback reply");
                Reply::Fallback {
                    text: self.fallback_reply.clone(),
                }
            }
        }
    }

    async fn record(&self, conversation_id: &str, role: ChatRole, content: &str) {
        if let Err(e) = self
            .history
            .save_message(conversation_id, role, content)
            .await
        {
            warn!(conversation_id, %role, error = %e, "failed to save message to history");
        }
    }
}

fn token_count(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 1.0 && value <= f64::from(u32::MAX)).then(|| value as u32)
}
