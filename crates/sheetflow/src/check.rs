// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sheetflow check` command implementation.
//!
//! Reads every configured sheet directly from the workbook (bypassing the
//! cache and its empty fallbacks) so unreadable sheets show up as failures.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use colored::Colorize;
use sheetflow_agent::dispatch::is_pending;
use sheetflow_config::SheetflowConfig;
use sheetflow_core::SheetSource;
use sheetflow_openai::OpenAiCompletion;
use sheetflow_sheets::CsvWorkbook;
use sheetflow_store::resolve_settings;
use sheetflow_store::rows::{parse_flow_rows, parse_prompt_rows, parse_scheduled_rows};

/// Status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, started: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: started.elapsed(),
        }
    }
}

/// Runs all checks, prints them, and returns the number of failures.
pub async fn run_check(config: &SheetflowConfig) -> usize {
    let mut results = Vec::new();

    let started = Instant::now();
    match CsvWorkbook::from_config(&config.sheets) {
        Ok(workbook) => {
            results.push(CheckResult::new(
                "workbook",
                CheckStatus::Pass,
                workbook.dir().display().to_string(),
                started,
            ));
            results.push(check_flows(&workbook, config).await);
            results.push(check_prompts(&workbook, config).await);
            results.push(check_schedule(&workbook, config).await);
        }
        Err(e) => results.push(CheckResult::new(
            "workbook",
            CheckStatus::Fail,
            e.to_string(),
            started,
        )),
    }

    let started = Instant::now();
    results.push(match OpenAiCompletion::from_config(&config.completion) {
        Ok(_) => CheckResult::new(
            "completion",
            CheckStatus::Pass,
            format!("{} ({})", config.completion.default_model, config.completion.base_url),
            started,
        ),
        Err(e) => CheckResult::new(
            "completion",
            CheckStatus::Warn,
            format!("{e}; only flow replies will work"),
            started,
        ),
    });

    print_results(&results);
    results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count()
}

async fn check_flows(workbook: &CsvWorkbook, config: &SheetflowConfig) -> CheckResult {
    let started = Instant::now();
    let sheets = &config.sheets;
    match workbook.fetch_range(&sheets.flows_sheet, &sheets.flows_range).await {
        Ok(rows) => {
            let flows = parse_flow_rows(&rows);
            let silent = flows.iter().filter(|f| !f.has_reply()).count();
            if flows.is_empty() {
                CheckResult::new("flows", CheckStatus::Warn, "no flows defined", started)
            } else if silent > 0 {
                CheckResult::new(
                    "flows",
                    CheckStatus::Warn,
                    format!("{} flows, {silent} without answer or media", flows.len()),
                    started,
                )
            } else {
                CheckResult::new(
                    "flows",
                    CheckStatus::Pass,
                    format!("{} flows", flows.len()),
                    started,
                )
            }
        }
        Err(e) => CheckResult::new("flows", CheckStatus::Fail, e.to_string(), started),
    }
}

async fn check_prompts(workbook: &CsvWorkbook, config: &SheetflowConfig) -> CheckResult {
    let started = Instant::now();
    let sheets = &config.sheets;
    match workbook.fetch_range(&sheets.prompts_sheet, &sheets.prompts_range).await {
        Ok(rows) => {
            let settings = resolve_settings(parse_prompt_rows(&rows));
            let message = format!("{} settings", settings.len());
            if settings.system_prompt().is_some() {
                CheckResult::new("prompts", CheckStatus::Pass, message, started)
            } else {
                CheckResult::new(
                    "prompts",
                    CheckStatus::Warn,
                    format!("{message}, no system prompt"),
                    started,
                )
            }
        }
        Err(e) => CheckResult::new("prompts", CheckStatus::Fail, e.to_string(), started),
    }
}

async fn check_schedule(workbook: &CsvWorkbook, config: &SheetflowConfig) -> CheckResult {
    let started = Instant::now();
    let sheets = &config.sheets;
    match workbook.fetch_range(&sheets.schedule_sheet, &sheets.schedule_range).await {
        Ok(rows) => {
            let first_row = sheets
                .schedule_range
                .parse::<sheetflow_core::A1Range>()
                .map(|range| range.first_row())
                .unwrap_or(2);
            let messages = parse_scheduled_rows(&rows, first_row);
            let pending = messages
                .iter()
                .filter(|m| is_pending(m.status.as_deref(), &config.schedule.pending_status))
                .count();
            CheckResult::new(
                "schedule",
                CheckStatus::Pass,
                format!("{} messages, {pending} pending", messages.len()),
                started,
            )
        }
        Err(e) => CheckResult::new("schedule", CheckStatus::Fail, e.to_string(), started),
    }
}

fn print_results(results: &[CheckResult]) {
    let use_color = std::io::stdout().is_terminal();

    println!();
    println!("  sheetflow check");
    println!("  {}", "-".repeat(50));

    for result in results {
        let duration_ms = result.duration.as_millis();
        let (symbol, plain, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), "[OK]  ", result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), "[WARN]", result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), "[FAIL]", result.message.red()),
        };
        if use_color {
            println!("    {symbol} {:<12} {message} ({duration_ms}ms)", result.name);
        } else {
            println!(
                "    {plain} {:<12} {} ({duration_ms}ms)",
                result.name, result.message
            );
        }
    }

    println!();
    let failures = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    if failures == 0 {
        println!("  All checks passed.");
    } else {
        let word = if failures == 1 { "check" } else { "checks" };
        println!("  {failures} {word} failed.");
    }
}
