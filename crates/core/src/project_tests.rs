// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_project_starts_idle_at_iteration_zero() {
    let now = chrono::Utc::now();
    let p = Project::new("demo", PathBuf::from("/tmp/demo"), ProjectConfig::default(), now);
    assert_eq!(p.phase, Phase::Idle);
    assert_eq!(p.iteration, 0);
    assert!(!p.is_running);
    p.validate().expect("fresh project is valid");
}

#[test]
fn iteration_exceeding_max_is_invalid() {
    let p = Project::builder().iteration(6).max_iterations(5).build();
    assert!(matches!(p.validate(), Err(ProjectInvariant::IterationExceedsMax { .. })));
}

#[test]
fn completed_requires_score_at_or_above_threshold() {
    let below = Project::builder()
    .phase(Phase::Completed)
    .quality_threshold(8.0)
    .last_score(7.9)
    .build();
    assert!(matches!(below.validate(), Err(ProjectInvariant::CompletedBelowThreshold { .. })));

    let at_threshold = Project::builder()
    .phase(Phase::Completed)
    .quality_threshold(8.0)
    .last_score(8.0)
    .build();
    at_threshold.validate().expect("score equal to threshold converges (>= comparison)");
}

#[test]
fn is_running_requires_active_phase() {
    let p = Project::builder().phase(Phase::Idle).is_running(true).build();
    assert!(matches!(p.validate(), Err(ProjectInvariant::RunningInInactivePhase { .. })));

    let p = Project::builder().phase(Phase::Engineering).is_running(true).build();
    p.validate().expect("running during an active phase is valid");
}

#[test]
fn name_must_be_url_safe() {
    let p = Project::builder().name("has a space").build();
    assert!(matches!(p.validate(), Err(ProjectInvariant::InvalidName(_))));
}

#[test]
fn reset_clears_iteration_and_score_but_keeps_name_and_root() {
    let now = chrono::Utc::now();
    let mut p = Project::builder()
    .phase(Phase::Failed)
    .iteration(4)
    .last_score(3.0)
    .error_message("boom")
    .build();
    p.reset(now);
    assert_eq!(p.phase, Phase::Idle);
    assert_eq!(p.iteration, 0);
    assert_eq!(p.last_score, None);
    assert_eq!(p.error_message, None);
    assert_eq!(p.failure, None);
}

#[test]
fn reset_is_idempotent() {
    let now = chrono::Utc::now();
    let mut p = Project::builder().phase(Phase::Engineering).iteration(2).build();
    p.reset(now);
    let once = p.clone();
    p.reset(now);
    assert_eq!(once, p);
}

#[test]
fn unknown_fields_round_trip_through_json() {
    let now = chrono::Utc::now();
    let mut p = Project::new("demo", PathBuf::from("/tmp/demo"), ProjectConfig::default(), now);
    p.extra.insert("future_field".to_string(), serde_json::json!("kept"));
    let json = serde_json::to_string(&p).expect("serialize");
    let back: Project = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.extra.get("future_field"), Some(&serde_json::json!("kept")));
}

#[test]
fn load_save_round_trip_law() {
    let now = chrono::Utc::now();
    let p = Project::new("my-proj", PathBuf::from("/tmp/my-proj"), ProjectConfig::default(), now);
    let json = serde_json::to_string(&p).expect("serialize");
    let back: Project = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(p, back);
}
