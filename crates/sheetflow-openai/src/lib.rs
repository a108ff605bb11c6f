// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion service for sheetflow.
//!
//! Implements [`CompletionService`] over any endpoint that speaks the Chat
//! Completions API. Per-request `model`, `temperature`, and `max_tokens`
//! override the configured defaults.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use sheetflow_config::model::CompletionConfig;
use sheetflow_core::{
    AdapterType, ChatMessage, CompletionRequest, CompletionService, HealthStatus, PluginAdapter,
    SheetflowError,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// Environment variable consulted when `completion.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiCompletion {
    client: OpenAiClient,
    default_model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiCompletion {
    /// Creates the service from configuration.
    ///
    /// # API Key Resolution
    /// 1. `completion.api_key` if set and non-empty
    /// 2. `OPENAI_API_KEY` environment variable
    /// 3. [`SheetflowError::Credentials`] otherwise
    pub fn from_config(config: &CompletionConfig) -> Result<Self, SheetflowError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_max_retries(config.max_retries);

        info!(
            model = config.default_model,
            endpoint = client.endpoint(),
            "completion service initialized"
        );

        Ok(Self::with_client(client, config))
    }

    /// Wraps an existing client, taking defaults from `config`.
    pub fn with_client(client: OpenAiClient, config: &CompletionConfig) -> Self {
        Self {
            client,
            default_model: config.default_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn to_api_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request
                .model
                .unwrap_or_else(|| self.default_model.clone()),
            messages: request.messages.into_iter().map(to_api_message).collect(),
            temperature: Some(request.temperature.unwrap_or(self.temperature)),
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
        }
    }
}

fn to_api_message(message: ChatMessage) -> ApiMessage {
    ApiMessage {
        role: message.role.to_string(),
        content: Some(message.content),
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, SheetflowError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            SheetflowError::Credentials(format!(
                "completion API key not found. Set completion.api_key in config \
                 or the {API_KEY_ENV} environment variable."
            ))
        })
}

#[async_trait]
impl PluginAdapter for OpenAiCompletion {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        // No probe request: it would spend tokens.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn generate(&self, request: CompletionRequest) -> Result<String, SheetflowError> {
        let api_request = self.to_api_request(request);
        let response = self.client.complete(&api_request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| SheetflowError::Provider {
                message: "completion response contained no text".into(),
                source: None,
            })
    }
}
