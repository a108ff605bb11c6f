// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the store, the matcher, and the response path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    History,
    Completion,
    Sink,
}

/// The three cached resources owned by the configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Flows,
    Prompts,
    ScheduledMessages,
}

/// One row of the flows sheet: a keyword list and the scripted reply.
///
/// Order within the flow table is significant; the first matching flow wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Comma-separated keywords exactly as typed in the sheet.
    pub keywords: String,
    pub answer: Option<String>,
    pub media: Option<String>,
}

impl FlowRecord {
    /// Splits the raw keyword cell on commas, without normalizing.
    pub fn raw_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.split(',')
    }

    /// Whether this flow carries anything to send back.
    pub fn has_reply(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
            || self.media.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

/// A prompt setting value after numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(f64),
    Text(String),
}

impl SettingValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            SettingValue::Number(_) => None,
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Number(n) => write!(f, "{n}"),
            SettingValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Resolved AI prompt settings keyed by setting name.
///
/// Built in one pass on every refresh and never mutated afterwards;
/// `system_prompt`, when present, is always [`SettingValue::Text`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptSettings(BTreeMap<String, SettingValue>);

impl PromptSettings {
    /// Key under which the sheet's leading prompt cell is stored.
    pub const SYSTEM_PROMPT: &'static str = "system_prompt";

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.get(Self::SYSTEM_PROMPT).and_then(SettingValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(SettingValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SettingValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, SettingValue>> for PromptSettings {
    fn from(map: BTreeMap<String, SettingValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, SettingValue)> for PromptSettings {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the scheduled-messages sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    /// 1-based sheet row; only meaningful for status updates.
    pub row_index: u32,
    pub date: Option<String>,
    pub time: Option<String>,
    pub phone: Option<String>,
    pub answer: Option<String>,
    pub media: Option<String>,
    pub status: Option<String>,
}

/// Speaker of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single turn in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
