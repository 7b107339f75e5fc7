// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::compression::PassthroughCompression;
use crate::fake::FakeProvider;
use tumbler_core::{AgentContext, AgentRole, CompressionConfig};
use tumbler_eventbus::{EventBus, Filter};
use tumbler_storage::StateStore;

fn store() -> (tempfile::TempDir, StateStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    (dir, store)
}

fn request<'a>(context: &'a AgentContext, compression: &'a CompressionConfig) -> RunRequest<'a> {
    RunRequest {
        project: "demo",
        role: AgentRole::Architect,
        iteration: 0,
        context,
        model: "claude-x",
        compression,
    }
}

#[tokio::test]
async fn accumulates_streamed_fragments_into_the_final_text() {
    let (_dir, store) = store();
    let bus = EventBus::default();
    let provider = FakeProvider::new("fake", vec!["Hello, ".to_string(), "world.".to_string()], 10, 20);
    let context = AgentContext { requirements: Some("do it".to_string()), ..Default::default() };
    let compression = CompressionConfig::default();
    let cancel = tokio_util::sync::CancellationToken::new();

    let result = run(&store, &bus, &provider, &PassthroughCompression, request(&context, &compression), &cancel)
    .await
    .expect("run succeeds");

    assert_eq!(result.text, "Hello, world.");
    assert_eq!(result.usage.input_tokens, 10);
    assert_eq!(result.usage.output_tokens, 20);
    assert_eq!(result.usage.provider_id, "fake");
}

#[tokio::test]
async fn persists_a_conversation_message_and_usage_record() {
    let (_dir, store) = store();
    let bus = EventBus::default();
    let provider = FakeProvider::new("fake", vec!["plan text".to_string()], 5, 7);
    let context = AgentContext { requirements: Some("do it".to_string()), ..Default::default() };
    let compression = CompressionConfig::default();
    let cancel = tokio_util::sync::CancellationToken::new();

    run(&store, &bus, &provider, &PassthroughCompression, request(&context, &compression), &cancel)
    .await
    .expect("run succeeds");

    let history = store.load_conversation("demo").expect("load conversation");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "plan text");

    let usage = store.load_usage("demo").expect("load usage");
    assert_eq!(usage.history.len(), 1);
}

#[tokio::test]
async fn publishes_a_chunk_per_fragment_and_a_final_update() {
    let (_dir, store) = store();
    let bus = EventBus::default();
    let mut subscription = bus.subscribe(Filter::for_project("demo")).await;
    let provider = FakeProvider::new("fake", vec!["a".to_string(), "b".to_string()], 1, 1);
    let context = AgentContext::default();
    let compression = CompressionConfig::default();
    let cancel = tokio_util::sync::CancellationToken::new();

    run(&store, &bus, &provider, &PassthroughCompression, request(&context, &compression), &cancel)
    .await
    .expect("run succeeds");

    let mut kinds = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(std::time::Duration::from_millis(100), subscription.recv()).await {
        kinds.push(event.kind().to_string());
    }
    assert_eq!(
        kinds,
        vec!["agent_thinking", "conversation_chunk", "conversation_chunk", "conversation_update", "usage_update"]
    );
}

#[tokio::test]
async fn cancellation_before_completion_produces_no_conversation_message() {
    let (_dir, store) = store();
    let bus = EventBus::default();
    let provider = FakeProvider::new("fake", vec!["partial".to_string()], 1, 1);
    let context = AgentContext::default();
    let compression = CompressionConfig::default();
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();

    let error = run(&store, &bus, &provider, &PassthroughCompression, request(&context, &compression), &cancel)
    .await
    .expect_err("cancelled run is an error");

    assert!(matches!(error, AgentRunError::Cancelled));
    let history = store.load_conversation("demo").expect("load conversation");
    assert!(history.is_empty());
}

#[tokio::test]
async fn compression_enabled_still_strips_markers_with_passthrough_transform() {
    let (_dir, store) = store();
    let bus = EventBus::default();
    let provider = FakeProvider::new("fake", vec!["ok".to_string()], 1, 1);
    let context = AgentContext { requirements: Some("secret requirements".to_string()), ..Default::default() };
    let compression = CompressionConfig { enabled: true, ..Default::default() };
    let cancel = tokio_util::sync::CancellationToken::new();

    run(&store, &bus, &provider, &PassthroughCompression, request(&context, &compression), &cancel)
    .await
    .expect("run succeeds");

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].messages[1].content.contains("<compress>"));
    assert!(sent[0].messages[1].content.contains("secret requirements"));
}
