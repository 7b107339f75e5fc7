// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tumbler_core::Phase;

#[test]
fn pong_serializes_with_tag_only() {
    let json = serde_json::to_value(Response::Pong).expect("serialize");
    assert_eq!(json, serde_json::json!({"type": "Pong"}));
}

#[test]
fn project_none_round_trips() {
    let response = Response::Project { project: None };
    let bytes = serde_json::to_vec(&response).expect("serialize");
    let decoded: Response = serde_json::from_slice(&bytes).expect("deserialize");
    assert_eq!(decoded, response);
}

#[test]
fn daemon_status_round_trips_all_fields() {
    let response = Response::DaemonStatus { uptime_secs: 42, projects_running: 2, capacity: 3 };
    let bytes = serde_json::to_vec(&response).expect("serialize");
    let decoded: Response = serde_json::from_slice(&bytes).expect("deserialize");
    assert_eq!(decoded, response);
}

#[test]
fn not_found_carries_project_name() {
    let response = Response::NotFound { project: "ghost".to_string() };
    let json = serde_json::to_value(&response).expect("serialize");
    assert_eq!(json, serde_json::json!({"type": "NotFound", "project": "ghost"}));
}

#[test]
fn project_list_entry_round_trips() {
    let entry = ProjectListEntry { name: "demo".to_string(), phase: Phase::Engineering, iteration: 3 };
    let bytes = serde_json::to_vec(&entry).expect("serialize");
    let decoded: ProjectListEntry = serde_json::from_slice(&bytes).expect("deserialize");
    assert_eq!(decoded, entry);
}

#[test]
fn projects_listing_round_trips_empty_and_populated() {
    let empty = Response::Projects { projects: Vec::new() };
    let bytes = serde_json::to_vec(&empty).expect("serialize");
    assert_eq!(serde_json::from_slice::<Response>(&bytes).expect("deserialize"), empty);

    let populated = Response::Projects {
        projects: vec![ProjectListEntry { name: "demo".to_string(), phase: Phase::Idle, iteration: 0 }],
    };
    let bytes = serde_json::to_vec(&populated).expect("serialize");
    assert_eq!(serde_json::from_slice::<Response>(&bytes).expect("deserialize"), populated);
}
