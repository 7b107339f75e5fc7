// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use tumbler_core::{AgentRole, MessageRole, Phase, ProjectConfig};

fn new_project(root: &Path, name: &str) -> Project {
    Project::new(name, root.join(name), ProjectConfig::default(), chrono::Utc::now())
}

#[test]
fn save_then_load_state_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    let project = new_project(dir.path(), "demo");
    store.save_state(&project).expect("save");
    let loaded = store.load_state("demo").expect("load").expect("present");
    assert_eq!(loaded, project);
}

#[test]
fn load_state_missing_project_returns_none() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    assert_eq!(store.load_state("nope").expect("load"), None);
}

#[test]
fn append_usage_accumulates_totals() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    let record = UsageRecord {
        timestamp: chrono::Utc::now(),
        agent: AgentRole::Engineer,
        iteration: 1,
        input_tokens: 100,
        output_tokens: 50,
        cost: 0.01,
        provider_id: "test-provider".into(),
    };
    store.append_usage("demo", record.clone()).expect("append 1");
    let log = store.append_usage("demo", record).expect("append 2");
    assert_eq!(log.total_cost, 0.02);
    assert_eq!(log.by_agent.get(&AgentRole::Engineer).expect("agent totals").calls, 2);
    assert_eq!(log.history.len(), 2);
}

#[test]
fn append_conversation_persists_across_loads() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    let message = ConversationMessage::new(AgentRole::Architect, MessageRole::Output, 1, "plan text");
    store.append_conversation("demo", message.clone()).expect("append");
    let history = store.load_conversation("demo").expect("load");
    assert_eq!(history, vec![message]);
}

#[test]
fn reset_project_clears_working_dirs_but_keeps_requirements() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    let root = dir.path().join("demo");
    std::fs::create_dir_all(root.join("01_requirements")).expect("mkdir");
    std::fs::write(root.join("01_requirements/requirements.md"), "do the thing").expect("write");
    std::fs::create_dir_all(root.join("03_staging/src")).expect("mkdir");
    std::fs::write(root.join("03_staging/src/main.py"), "print(1)").expect("write");

    let record = UsageRecord {
        timestamp: chrono::Utc::now(),
        agent: AgentRole::Verifier,
        iteration: 1,
        input_tokens: 1,
        output_tokens: 1,
        cost: 0.0,
        provider_id: "p".into(),
    };
    store.append_usage("demo", record).expect("append usage");

    store.reset_project("demo").expect("reset");

    assert!(root.join("01_requirements/requirements.md").exists());
    assert!(root.join("03_staging").is_dir());
    assert!(!root.join("03_staging/src").exists());
    assert_eq!(store.load_usage("demo").expect("load usage"), UsageLog::default());
}

#[test]
fn delete_project_removes_entire_directory() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    let project = new_project(dir.path(), "demo");
    store.save_state(&project).expect("save");
    assert!(dir.path().join("demo").exists());
    store.delete_project("demo").expect("delete");
    assert!(!dir.path().join("demo").exists());
}

#[test]
fn delete_project_missing_is_a_noop() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    store.delete_project("nope").expect("delete noop");
}

#[test]
fn list_projects_finds_every_saved_state() {
    let dir = tempdir().expect("tempdir");
    let store = StateStore::new(dir.path().to_path_buf());
    store.save_state(&new_project(dir.path(), "alpha")).expect("save alpha");
    store.save_state(&new_project(dir.path(), "beta")).expect("save beta");

    let mut summaries = store.list_projects().expect("list");
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].name, "alpha");
    assert_eq!(summaries[0].phase, Phase::Idle);
    assert_eq!(summaries[1].name, "beta");
}

#[test]
fn list_projects_on_missing_workspace_root_is_empty() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let store = StateStore::new(missing);
    assert_eq!(store.list_projects().expect("list"), Vec::new());
}
