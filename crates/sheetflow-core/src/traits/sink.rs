// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery trait for scheduled messages.

use async_trait::async_trait;

use crate::error::SheetflowError;
use crate::traits::adapter::PluginAdapter;

/// Adapter that delivers a message to a phone number on some channel.
///
/// The transport itself lives outside sheetflow; this is the seam the
/// scheduled-message dispatcher calls.
#[async_trait]
pub trait MessageSink: PluginAdapter {
    async fn deliver(
        &self,
        phone: &str,
        text: Option<&str>,
        media: Option<&str>,
    ) -> Result<(), SheetflowError>;
}
