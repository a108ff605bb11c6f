// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt settings resolution.
//!
//! Raw sheet values are coerced in a single pass: anything that parses
//! entirely as a finite number becomes [`SettingValue::Number`], the rest
//! stays text. `system_prompt` is always kept as text.

use std::collections::BTreeMap;
use std::sync::Arc;

use sheetflow_core::{PromptSettings, SettingValue};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::store::ConfigStore;

/// Coerces one raw cell value.
pub fn coerce_value(raw: &str) -> SettingValue {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => SettingValue::Number(n),
        _ => SettingValue::Text(raw.to_string()),
    }
}

/// Builds the settings object from the raw mapping produced by row parsing.
pub fn resolve_settings(raw: BTreeMap<String, String>) -> PromptSettings {
    raw.into_iter()
        .map(|(key, value)| {
            let value = if key == PromptSettings::SYSTEM_PROMPT {
                SettingValue::Text(value)
            } else {
                coerce_value(&value)
            };
            (key, value)
        })
        .collect()
}

/// Load-once guard for prompt settings held by a long-lived caller.
///
/// The first call with a non-empty result latches it; later calls return the
/// latched value without touching the store. An empty result (the store's
/// fallback when the source is down) is returned but not latched, so the
/// next call tries again.
#[derive(Default)]
pub struct SettingsOnce {
    cell: OnceCell<Arc<PromptSettings>>,
}

impl SettingsOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(&self, store: &ConfigStore) -> Arc<PromptSettings> {
        let loaded = self
            .cell
            .get_or_try_init(|| async {
                let settings = store.prompt_settings().await;
                if settings.is_empty() {
                    Err(settings)
                } else {
                    debug!(settings = settings.len(), "prompt settings latched");
                    Ok(settings)
                }
            })
            .await;

        match loaded {
            Ok(settings) => Arc::clone(settings),
            Err(empty) => {
                warn!("prompt settings unavailable, continuing without them");
                empty
            }
        }
    }

    /// The latched settings, if any call has succeeded yet.
    pub fn get(&self) -> Option<Arc<PromptSettings>> {
        self.cell.get().cloned()
    }
}
