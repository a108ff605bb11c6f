// SPDX-FileCopyrightText: 2026 Sheetflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Responder and dispatcher tests over mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use sheetflow_agent::{DispatchReport, Dispatcher, InMemoryHistory, Reply, Responder};
use sheetflow_config::model::{ScheduleConfig, SheetsConfig};
use sheetflow_core::{ChatHistory, ChatMessage, ChatRole};
use sheetflow_router::MatchTier;
use sheetflow_store::ConfigStore;
use sheetflow_test_utils::{Delivery, MockCompletion, MockSheetSource, RecordingSink, row};
use tracing_test::traced_test;

const FALLBACK: &str = "Lo siento, intenta más tarde.";

fn source() -> Arc<MockSheetSource> {
    let source = Arc::new(MockSheetSource::new());
    source.set_sheet(
        "flows",
        2,
        vec![
            row(&["hola, buenos dias", "¡Hola! ¿En qué te ayudo?"]),
            row(&["menu", "", "https://cdn.example/menu.pdf"]),
            row(&["soporte"]),
        ],
    );
    source.set_sheet(
        "prompts",
        2,
        vec![
            row(&["Eres el asistente de la tienda."]),
            row(&["", "temperature", "0.3"]),
            row(&["", "max_tokens", "120"]),
            row(&["", "model", "gpt-4o"]),
        ],
    );
    source
}

fn store(source: &Arc<MockSheetSource>) -> Arc<ConfigStore> {
    let sheets = SheetsConfig {
        workbook_dir: "unused".into(),
        ..SheetsConfig::default()
    };
    Arc::new(ConfigStore::new(source.clone(), &sheets, Duration::from_secs(300)).unwrap())
}

struct Harness {
    source: Arc<MockSheetSource>,
    completion: Arc<MockCompletion>,
    history: Arc<InMemoryHistory>,
    responder: Responder,
}

fn harness() -> Harness {
    let source = source();
    let completion = Arc::new(MockCompletion::new());
    let history = Arc::new(InMemoryHistory::new(10));
    let responder = Responder::new(
        store(&source),
        completion.clone(),
        history.clone(),
        FALLBACK,
    );
    Harness {
        source,
        completion,
        history,
        responder,
    }
}

#[tokio::test]
async fn matching_flow_replies_without_completion() {
    let h = harness();

    let reply = h.responder.reply("c1", "¡Hola! buenos días").await;

    assert_eq!(
        reply,
        Reply::Flow {
            answer: Some("¡Hola! ¿En qué te ayudo?".into()),
            media: None,
            keyword: "hola".into(),
            tier: MatchTier::WholeWord,
        }
    );
    assert!(h.completion.requests().await.is_empty());
    assert_eq!(h.history.get_context("c1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn media_only_flow_is_a_reply() {
    let h = harness();

    let reply = h.responder.reply("c1", "MENÚ").await;

    assert_eq!(reply.media(), Some("https://cdn.example/menu.pdf"));
    assert_eq!(reply.text(), None);
    assert!(h.completion.requests().await.is_empty());
}

#[tokio::test]
async fn flow_without_reply_falls_through_to_completion() {
    let h = harness();
    h.completion.add_response("Te comunico con soporte.".into()).await;

    let reply = h.responder.reply("c1", "soporte").await;

    assert_eq!(
        reply,
        Reply::Generated {
            text: "Te comunico con soporte.".into()
        }
    );
}

#[tokio::test]
async fn completion_request_carries_prompt_history_and_settings() {
    let h = harness();
    h.history
        .save_message("c1", ChatRole::User, "me llamo Ana")
        .await
        .unwrap();
    h.completion.add_response("Claro, Ana.".into()).await;

    let reply = h.responder.reply("c1", "¿cuánto cuesta el envío?").await;
    assert_eq!(reply.text(), Some("Claro, Ana."));

    let requests = h.completion.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.messages,
        vec![
            ChatMessage::new(ChatRole::System, "Eres el asistente de la tienda."),
            ChatMessage::new(ChatRole::User, "me llamo Ana"),
            ChatMessage::new(ChatRole::User, "¿cuánto cuesta el envío?"),
        ]
    );
    assert_eq!(request.model.as_deref(), Some("gpt-4o"));
    assert_eq!(request.temperature, Some(0.3));
    assert_eq!(request.max_tokens, Some(120));

    let context = h.history.get_context("c1").await.unwrap();
    assert_eq!(
        context.last(),
        Some(&ChatMessage::new(ChatRole::Assistant, "Claro, Ana."))
    );
}

#[tokio::test]
async fn settings_are_loaded_once_per_responder() {
    let h = harness();

    h.responder.reply("c1", "pregunta uno").await;
    h.responder.store().invalidate_all();
    h.responder.reply("c1", "pregunta dos").await;

    assert_eq!(h.source.fetch_count("prompts"), 1);
    assert_eq!(h.source.fetch_count("flows"), 2);
}

#[tokio::test]
#[traced_test]
async fn completion_failure_returns_fallback() {
    let h = harness();
    h.completion.set_fail(true);

    let reply = h.responder.reply("c1", "¿abren el domingo?").await;

    assert_eq!(
        reply,
        Reply::Fallback {
            text: FALLBACK.into()
        }
    );
    assert!(logs_contain("completion failed"));
}

#[tokio::test]
async fn unavailable_source_still_replies() {
    let h = harness();
    h.source.set_fail_fetch(true);

    let reply = h.responder.reply("c1", "hola").await;

    assert_eq!(reply.text(), Some("mock response"));
    let request = &h.completion.requests().await[0];
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.model, None);
}

fn schedule_source() -> Arc<MockSheetSource> {
    let source = Arc::new(MockSheetSource::new());
    source.set_sheet(
        "scheduled",
        2,
        vec![
            row(&["2026-10-16", "09:00", "+5215550001", "Tu cita es hoy", "", "pendiente"]),
            row(&["2026-10-16", "18:00", "+5215550002", "Más tarde"]),
            row(&["15/10/2026", "", "+5215550003", "", "https://cdn/promo.jpg"]),
            row(&["2026-10-16", "08:00", "+5215550004", "Ya enviado", "", "enviado"]),
            row(&["2026-10-16", "08:00", "", "Sin teléfono"]),
            row(&["ayer", "08:00", "+5215550005", "Fecha rota"]),
            row(&["2026-10-16", "07:00", "+5215550006", "Falla"]),
        ],
    );
    source
}

fn noon() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-10-16 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

#[tokio::test]
async fn dispatch_sends_due_messages_and_records_status() {
    let source = schedule_source();
    let sink = Arc::new(RecordingSink::new());
    sink.fail_for("+5215550006").await;
    let dispatcher = Dispatcher::new(store(&source), sink.clone(), ScheduleConfig::default());

    let report = dispatcher.run_once(noon()).await;

    assert_eq!(
        report,
        DispatchReport {
            sent: 2,
            failed: 1,
            skipped: 2,
            unrecorded: 0,
        }
    );
    assert_eq!(
        sink.deliveries().await,
        vec![
            Delivery {
                phone: "+5215550001".into(),
                text: Some("Tu cita es hoy".into()),
                media: None,
            },
            Delivery {
                phone: "+5215550003".into(),
                text: None,
                media: Some("https://cdn/promo.jpg".into()),
            },
        ]
    );

    let writes: Vec<(String, String)> = source
        .writes()
        .into_iter()
        .map(|w| (w.cell, w.value))
        .collect();
    assert_eq!(
        writes,
        vec![
            ("F2".to_string(), "enviado".to_string()),
            ("F4".to_string(), "enviado".to_string()),
            ("F8".to_string(), "error".to_string()),
        ]
    );
}

#[tokio::test]
async fn second_pass_does_not_resend() {
    let source = schedule_source();
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = Dispatcher::new(store(&source), sink.clone(), ScheduleConfig::default());

    let first = dispatcher.run_once(noon()).await;
    let second = dispatcher.run_once(noon()).await;

    assert_eq!(first.sent, 3);
    assert_eq!(second.sent, 0);
    assert_eq!(sink.deliveries().await.len(), 3);
}

#[tokio::test]
#[traced_test]
async fn failed_status_write_is_reported() {
    let source = schedule_source();
    source.set_fail_write(true);
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = Dispatcher::new(store(&source), sink, ScheduleConfig::default());

    let report = dispatcher.run_once(noon()).await;

    assert_eq!(report.sent, 3);
    assert_eq!(report.unrecorded, 3);
    assert!(logs_contain("message status write failed"));
}
