// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion service for deterministic testing.
//!
//! Responses are popped from a FIFO queue. When the queue is empty,
//! a default "mock response" text is returned.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use sheetflow_core::{
    AdapterType, CompletionRequest, CompletionService, HealthStatus, PluginAdapter,
    SheetflowError,
};

/// A mock completion service that returns pre-configured responses and
/// records every request it receives.
pub struct MockCompletion {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    fail: AtomicBool,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: AtomicBool::new(false),
        }
    }

    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn generate(&self, request: CompletionRequest) -> Result<String, SheetflowError> {
        self.requests.lock().await.push(request);

        if self.fail.load(Ordering::SeqCst) {
            return Err(SheetflowError::Provider {
                message: "mock completion failure".into(),
                source: None,
            });
        }

        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string()))
    }
}
