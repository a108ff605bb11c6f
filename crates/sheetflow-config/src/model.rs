// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for sheetflow.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level sheetflow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetflowConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Workbook location and the sheet/range contract of each resource.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Freshness window for cached sheet data.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Completion service settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Conversation history settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Scheduled-message status vocabulary.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Reply sent when neither a flow nor the completion service can answer.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

fn default_agent_name() -> String {
    "sheetflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_reply() -> String {
    "Lo siento, no pude procesar tu mensaje. Intenta de nuevo en unos minutos.".to_string()
}

/// Sheet names and A1 ranges for each resource.
///
/// Ranges start at row 2 by default because row 1 holds column headers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Directory holding one `<sheet>.csv` file per sheet.
    #[serde(default = "default_workbook_dir")]
    pub workbook_dir: String,

    #[serde(default = "default_flows_sheet")]
    pub flows_sheet: String,

    /// Columns: keywords, answer, media.
    #[serde(default = "default_flows_range")]
    pub flows_range: String,

    #[serde(default = "default_prompts_sheet")]
    pub prompts_sheet: String,

    /// Columns: system prompt (first row only), setting name, setting value.
    #[serde(default = "default_prompts_range")]
    pub prompts_range: String,

    #[serde(default = "default_schedule_sheet")]
    pub schedule_sheet: String,

    /// Columns: date, time, phone, answer, media, status.
    #[serde(default = "default_schedule_range")]
    pub schedule_range: String,

    /// Column letter written by status updates.
    #[serde(default = "default_status_column")]
    pub status_column: String,

    /// Sheet used to persist transcripts. `None` keeps history in memory.
    #[serde(default)]
    pub history_sheet: Option<String>,

    /// Columns: timestamp, conversation id, role, content.
    #[serde(default = "default_history_range")]
    pub history_range: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            workbook_dir: default_workbook_dir(),
            flows_sheet: default_flows_sheet(),
            flows_range: default_flows_range(),
            prompts_sheet: default_prompts_sheet(),
            prompts_range: default_prompts_range(),
            schedule_sheet: default_schedule_sheet(),
            schedule_range: default_schedule_range(),
            status_column: default_status_column(),
            history_sheet: None,
            history_range: default_history_range(),
        }
    }
}

fn default_workbook_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("sheetflow").join("workbook"))
        .unwrap_or_else(|| std::path::PathBuf::from("workbook"))
        .to_string_lossy()
        .to_string()
}

fn default_flows_sheet() -> String {
    "flows".to_string()
}

fn default_flows_range() -> String {
    "A2:C".to_string()
}

fn default_prompts_sheet() -> String {
    "prompts".to_string()
}

fn default_prompts_range() -> String {
    "A2:C".to_string()
}

fn default_schedule_sheet() -> String {
    "scheduled".to_string()
}

fn default_schedule_range() -> String {
    "A2:F".to_string()
}

fn default_status_column() -> String {
    "F".to_string()
}

fn default_history_range() -> String {
    "A2:D".to_string()
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a fetched sheet stays fresh. Shared by all three resources.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

/// OpenAI-compatible completion service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used unless the prompts sheet sets `model`.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP errors (429, 5xx).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    1
}

/// Conversation history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Number of prior messages sent to the completion service.
    #[serde(default = "default_max_context_messages")]
    pub max_context_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_context_messages: default_max_context_messages(),
        }
    }
}

fn default_max_context_messages() -> usize {
    10
}

/// Status values written to the scheduled-messages sheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_pending_status")]
    pub pending_status: String,

    #[serde(default = "default_sent_status")]
    pub sent_status: String,

    #[serde(default = "default_failed_status")]
    pub failed_status: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pending_status: default_pending_status(),
            sent_status: default_sent_status(),
            failed_status: default_failed_status(),
        }
    }
}

fn default_pending_status() -> String {
    "pendiente".to_string()
}

fn default_sent_status() -> String {
    "enviado".to_string()
}

fn default_failed_status() -> String {
    "error".to_string()
}
