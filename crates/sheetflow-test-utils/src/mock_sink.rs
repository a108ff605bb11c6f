// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message sink that records deliveries instead of sending them.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sheetflow_core::{AdapterType, HealthStatus, MessageSink, PluginAdapter, SheetflowError};

/// A captured delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub phone: String,
    pub text: Option<String>,
    pub media: Option<String>,
}

/// Records deliveries; phones registered with [`RecordingSink::fail_for`] error.
#[derive(Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_for(&self, phone: &str) {
        self.failing.lock().await.insert(phone.to_string());
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingSink {
    fn name(&self) -> &str {
        "recording-sink"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, SheetflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(
        &self,
        phone: &str,
        text: Option<&str>,
        media: Option<&str>,
    ) -> Result<(), SheetflowError> {
        if self.failing.lock().await.contains(phone) {
            return Err(SheetflowError::Internal(format!("delivery to {phone} refused")));
        }
        self.deliveries.lock().await.push(Delivery {
            phone: phone.to_string(),
            text: text.map(str::to_string),
            media: media.map(str::to_string),
        });
        Ok(())
    }
}
