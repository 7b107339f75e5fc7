// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tumbler_core::FileEntry;

#[test]
fn architect_iteration_zero_asks_for_a_fresh_plan() {
    let context = AgentContext { requirements: Some("build a cli".to_string()), ..Default::default() };
    let messages = assemble(AgentRole::Architect, 0, &context);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[1].content.contains("Requirements"));
    assert!(messages[1].content.contains("build a cli"));
    assert!(messages[2].content.contains("Produce the implementation plan"));
}

#[test]
fn architect_revision_references_previous_feedback() {
    let context = AgentContext {
        requirements: Some("build a cli".to_string()),
        previous_plan: Some("old plan".to_string()),
        previous_feedback: Some("missing tests".to_string()),
        ..Default::default()
    };
    let messages = assemble(AgentRole::Architect, 1, &context);
    assert!(messages[1].content.contains("Previous plan"));
    assert!(messages[1].content.contains("missing tests"));
    assert!(messages[2].content.contains("Revise the plan"));
}

#[test]
fn compression_markers_never_reach_the_wire() {
    let context = AgentContext { requirements: Some("x".to_string()), ..Default::default() };
    let messages = assemble(AgentRole::Architect, 0, &context);
    assert!(!messages[1].content.contains(COMPRESS_OPEN));
    assert!(!messages[1].content.contains(COMPRESS_CLOSE));
}

#[test]
fn verifier_static_review_only_marker_is_outside_compression() {
    let context = AgentContext {
        current_plan: Some("plan".to_string()),
        static_review_only: true,
        ..Default::default()
    };
    let messages = assemble(AgentRole::Verifier, 1, &context);
    assert!(messages[1].content.contains("static code review only"));
}

#[test]
fn engineer_sees_previous_staging_and_feedback_uncompressed_vs_compressed() {
    let context = AgentContext {
        current_plan: Some("plan".to_string()),
        previous_staging: Some(vec![FileEntry { path: "main.py".to_string(), content: "print(1)".to_string() }]),
        previous_feedback: Some("fix the bug".to_string()),
        ..Default::default()
    };
    let messages = assemble(AgentRole::Engineer, 2, &context);
    assert!(messages[1].content.contains("main.py"));
    assert!(messages[1].content.contains("fix the bug"));
}

#[test]
fn engineer_system_prompt_demands_json_only() {
    let messages = assemble(AgentRole::Engineer, 0, &AgentContext::default());
    assert!(messages[0].content.contains("JSON array"));
}
