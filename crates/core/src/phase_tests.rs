// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn terminal_phases() {
    assert!(Phase::Completed.is_terminal());
    assert!(Phase::Failed.is_terminal());
    assert!(!Phase::Idle.is_terminal());
    assert!(!Phase::Planning.is_terminal());
}

#[test]
fn active_phases() {
    assert!(Phase::Planning.is_active());
    assert!(Phase::Engineering.is_active());
    assert!(Phase::Verifying.is_active());
    assert!(!Phase::Idle.is_active());
    assert!(!Phase::Completed.is_active());
    assert!(!Phase::Failed.is_active());
}

#[test]
fn display_matches_json_tag() {
    assert_eq!(Phase::Engineering.to_string(), "engineering");
}

#[test]
fn phase_json_round_trip() {
    for phase in [
        Phase::Idle,
        Phase::Planning,
        Phase::Engineering,
        Phase::Verifying,
        Phase::Completed,
        Phase::Failed,
    ] {
        let json = serde_json::to_string(&phase).expect("serialize");
        let back: Phase = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(phase, back);
    }
}

#[test]
fn failure_reason_display() {
    let r = FailureReason::IterationCap { iteration: 3, max_iterations: 3 };
    assert_eq!(r.to_string(), "iteration cap reached: 3/3");
}
