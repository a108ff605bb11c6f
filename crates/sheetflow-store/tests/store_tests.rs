// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration store over a mock sheet source.

use std::sync::Arc;
use std::time::Duration;

use sheetflow_config::model::SheetsConfig;
use sheetflow_core::{Resource, SettingValue};
use sheetflow_store::{ConfigStore, SettingsOnce};
use sheetflow_test_utils::{MockSheetSource, row};
use tracing_test::traced_test;

const TTL: Duration = Duration::from_secs(300);

fn seeded_source() -> Arc<MockSheetSource> {
    let source = Arc::new(MockSheetSource::new());
    source.set_sheet(
        "flows",
        2,
        vec![
            row(&["hola, buenos dias", "¡Hola! ¿En qué te ayudo?"]),
            row(&["precio", "Cuesta 10", "https://cdn.example/precio.png"]),
        ],
    );
    source.set_sheet(
        "prompts",
        2,
        vec![
            row(&["Eres un asistente amable."]),
            row(&["", "temperature", "0.4"]),
            row(&["", "max_tokens", "200"]),
            row(&["", "model", "gpt-4o"]),
        ],
    );
    source.set_sheet(
        "scheduled",
        2,
        vec![
            row(&["2026-01-01", "09:00", "+5215555555555", "Feliz año", "", "pendiente"]),
            row(&["2026-01-02", "", "+5215555555556", "Recordatorio"]),
        ],
    );
    source
}

fn store_over(source: &Arc<MockSheetSource>) -> ConfigStore {
    let sheets = SheetsConfig {
        workbook_dir: "unused".into(),
        ..SheetsConfig::default()
    };
    ConfigStore::new(source.clone(), &sheets, TTL).unwrap()
}

#[tokio::test(start_paused = true)]
async fn reads_are_served_from_cache_within_ttl() {
    let source = seeded_source();
    let store = store_over(&source);

    let first = store.flows().await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].media.as_deref(), Some("https://cdn.example/precio.png"));

    tokio::time::advance(TTL - Duration::from_millis(1)).await;
    let second = store.flows().await;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetch_count("flows"), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    store.flows().await;
    assert_eq!(source.fetch_count("flows"), 2);
}

#[tokio::test(start_paused = true)]
async fn status_update_invalidates_only_scheduled_messages() {
    let source = seeded_source();
    let store = store_over(&source);

    let flows_before = store.flows().await;
    store.prompt_settings().await;
    let scheduled = store.scheduled_messages().await;
    assert_eq!(scheduled[0].row_index, 2);
    assert_eq!(scheduled[0].status.as_deref(), Some("pendiente"));

    // The flow table changes upstream but must keep serving from cache.
    source.set_rows("flows", vec![row(&["adios", "Hasta luego"])]);

    assert!(store.update_message_status(2, "enviado").await);

    let writes = source.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].sheet, "scheduled");
    assert_eq!(writes[0].cell, "F2");
    assert_eq!(writes[0].value, "enviado");

    let scheduled = store.scheduled_messages().await;
    assert_eq!(scheduled[0].status.as_deref(), Some("enviado"));
    assert_eq!(source.fetch_count("scheduled"), 2);

    let flows_after = store.flows().await;
    assert!(Arc::ptr_eq(&flows_before, &flows_after));
    assert_eq!(flows_after[0].keywords, "hola, buenos dias");
    assert_eq!(source.fetch_count("flows"), 1);

    store.prompt_settings().await;
    assert_eq!(source.fetch_count("prompts"), 1);
}

#[tokio::test]
#[traced_test]
async fn failed_status_write_keeps_cache() {
    let source = seeded_source();
    let store = store_over(&source);

    store.scheduled_messages().await;
    source.set_fail_write(true);

    assert!(!store.update_message_status(3, "enviado").await);
    assert!(logs_contain("message status write failed"));

    store.scheduled_messages().await;
    assert_eq!(source.fetch_count("scheduled"), 1);
}

#[tokio::test]
#[traced_test]
async fn unavailable_source_serves_empty_fallbacks() {
    let source = seeded_source();
    source.set_fail_fetch(true);
    let store = store_over(&source);

    assert!(store.flows().await.is_empty());
    assert!(store.prompt_settings().await.is_empty());
    assert!(store.scheduled_messages().await.is_empty());
    assert!(logs_contain("serving empty fallback"));

    // No negative caching: the next read retries.
    source.set_fail_fetch(false);
    assert_eq!(store.flows().await.len(), 2);
    assert_eq!(source.fetch_count("flows"), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_entry_for_next_read() {
    let source = seeded_source();
    let store = store_over(&source);

    assert_eq!(store.flows().await.len(), 2);
    tokio::time::advance(TTL).await;

    source.set_fail_fetch(true);
    assert!(store.flows().await.is_empty());

    source.set_fail_fetch(false);
    assert_eq!(store.flows().await.len(), 2);
    assert_eq!(source.fetch_count("flows"), 3);
}

#[tokio::test]
async fn prompt_settings_are_coerced() {
    let source = seeded_source();
    let store = store_over(&source);

    let settings = store.prompt_settings().await;
    assert_eq!(settings.system_prompt(), Some("Eres un asistente amable."));
    assert_eq!(settings.get("temperature"), Some(&SettingValue::Number(0.4)));
    assert_eq!(settings.number("max_tokens"), Some(200.0));
    assert_eq!(settings.text("model"), Some("gpt-4o"));
}

#[tokio::test]
async fn invalidate_all_refetches_every_resource() {
    let source = seeded_source();
    let store = store_over(&source);

    store.flows().await;
    store.prompt_settings().await;
    store.scheduled_messages().await;

    store.invalidate_all();
    store.invalidate_all();

    store.flows().await;
    store.prompt_settings().await;
    store.scheduled_messages().await;

    for sheet in ["flows", "prompts", "scheduled"] {
        assert_eq!(source.fetch_count(sheet), 2, "{sheet}");
    }
}

#[tokio::test]
async fn invalidate_targets_one_resource() {
    let source = seeded_source();
    let store = store_over(&source);

    store.flows().await;
    store.prompt_settings().await;

    store.invalidate(Resource::Prompts);
    store.flows().await;
    store.prompt_settings().await;

    assert_eq!(source.fetch_count("flows"), 1);
    assert_eq!(source.fetch_count("prompts"), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_collapse_into_one_fetch() {
    let source = seeded_source();
    source.set_fetch_delay(Some(Duration::from_millis(50)));
    let store = store_over(&source);

    let results = futures::future::join_all((0..8).map(|_| store.flows())).await;

    assert!(results.iter().all(|flows| flows.len() == 2));
    assert_eq!(source.fetch_count("flows"), 1);
}

#[tokio::test]
async fn settings_once_latches_first_non_empty_load() {
    let source = seeded_source();
    let store = store_over(&source);
    let once = SettingsOnce::new();

    assert!(once.get().is_none());
    let first = once.get_or_load(&store).await;
    store.invalidate(Resource::Prompts);
    let second = once.get_or_load(&store).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetch_count("prompts"), 1);
}

#[tokio::test]
async fn settings_once_retries_after_empty_load() {
    let source = seeded_source();
    source.set_fail_fetch(true);
    let store = store_over(&source);
    let once = SettingsOnce::new();

    assert!(once.get_or_load(&store).await.is_empty());
    assert!(once.get().is_none());

    source.set_fail_fetch(false);
    let loaded = once.get_or_load(&store).await;
    assert_eq!(loaded.number("max_tokens"), Some(200.0));
    assert!(once.get().is_some());
}
