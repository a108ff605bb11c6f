// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-zero TTL, non-empty sheet
//! names, well-formed A1 ranges, and sane completion parameters.

use sheetflow_core::{A1Range, CellRef};

use crate::diagnostic::ConfigError;
use crate::model::SheetflowConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation rather than failing fast.
pub fn validate_config(config: &SheetflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.cache.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.ttl_secs must be greater than 0".to_string(),
        });
    }

    if config.sheets.workbook_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "sheets.workbook_dir must not be empty".to_string(),
        });
    }

    let sheets = &config.sheets;
    for (key, name) in [
        ("flows_sheet", Some(&sheets.flows_sheet)),
        ("prompts_sheet", Some(&sheets.prompts_sheet)),
        ("schedule_sheet", Some(&sheets.schedule_sheet)),
        ("history_sheet", sheets.history_sheet.as_ref()),
    ] {
        if let Some(name) = name
            && name.trim().is_empty()
        {
            errors.push(ConfigError::Validation {
                message: format!("sheets.{key} must not be empty"),
            });
        }
    }

    for (key, range) in [
        ("flows_range", &sheets.flows_range),
        ("prompts_range", &sheets.prompts_range),
        ("schedule_range", &sheets.schedule_range),
        ("history_range", &sheets.history_range),
    ] {
        if let Err(e) = range.parse::<A1Range>() {
            errors.push(ConfigError::Validation {
                message: format!("sheets.{key} `{range}` is not a valid A1 range: {e}"),
            });
        }
    }

    match sheets.status_column.parse::<CellRef>() {
        Ok(cell) if cell.row.is_none() => {}
        _ => errors.push(ConfigError::Validation {
            message: format!(
                "sheets.status_column `{}` must be a column letter such as `F`",
                sheets.status_column
            ),
        }),
    }

    let temperature = config.completion.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(ConfigError::Validation {
            message: format!("completion.temperature must be within 0..=2, got {temperature}"),
        });
    }

    if config.completion.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "completion.max_tokens must be greater than 0".to_string(),
        });
    }

    if config.history.max_context_messages == 0 {
        errors.push(ConfigError::Validation {
            message: "history.max_context_messages must be at least 1".to_string(),
        });
    }

    let schedule = &config.schedule;
    if schedule.sent_status.trim().is_empty() || schedule.failed_status.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "schedule.sent_status and schedule.failed_status must not be empty"
                .to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SheetflowConfig::default()).is_ok());
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let mut config = SheetflowConfig::default();
        config.cache.ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "ttl_secs"));
    }

    #[test]
    fn malformed_range_fails_validation() {
        let mut config = SheetflowConfig::default();
        config.sheets.flows_range = "2A:C".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "flows_range"));
    }

    #[test]
    fn status_column_must_not_carry_a_row() {
        let mut config = SheetflowConfig::default();
        config.sheets.status_column = "F2".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "status_column"));
    }

    #[test]
    fn empty_history_sheet_fails_but_absent_is_fine() {
        let mut config = SheetflowConfig::default();
        config.sheets.history_sheet = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "history_sheet"));

        config.sheets.history_sheet = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = SheetflowConfig::default();
        config.cache.ttl_secs = 0;
        config.completion.temperature = 3.5;
        config.history.max_context_messages = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
