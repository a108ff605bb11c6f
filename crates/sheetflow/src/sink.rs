// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message sink that prints outbound messages instead of sending them.

use async_trait::async_trait;
use colored::Colorize;
use sheetflow_core::{AdapterType, HealthStatus, MessageSink, PluginAdapter, SheetflowError};

pub struct StdoutSink;

#[async_trait]
impl PluginAdapter for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
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
impl MessageSink for StdoutSink {
    async fn deliver(
        &self,
        phone: &str,
        text: Option<&str>,
        media: Option<&str>,
    ) -> Result<(), SheetflowError> {
        let to = format!("-> {phone}").cyan();
        if let Some(text) = text {
            println!("{to} {text}");
        }
        if let Some(media) = media {
            println!("{to} {} {media}", "[media]".dimmed());
        }
        Ok(())
    }
}
