// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record(agent: AgentRole, cost: f64) -> UsageRecord {
    UsageRecord {
        timestamp: chrono::Utc::now(),
        agent,
        iteration: 1,
        input_tokens: 100,
        output_tokens: 50,
        cost,
        provider_id: "anthropic".to_string(),
    }
}

#[test]
fn append_accumulates_totals_and_history() {
    let mut log = UsageLog::default();
    log.append(record(AgentRole::Architect, 0.01));
    log.append(record(AgentRole::Architect, 0.02));
    log.append(record(AgentRole::Engineer, 0.05));

    assert_eq!(log.history.len(), 3);
    assert!((log.total_cost - 0.08).abs() < 1e-9);
    let architect = log.by_agent.get(&AgentRole::Architect).expect("present");
    assert_eq!(architect.calls, 2);
    assert_eq!(architect.input_tokens, 200);
}

#[test]
fn usage_log_round_trips_through_json() {
    let mut log = UsageLog::default();
    log.append(record(AgentRole::Verifier, 0.03));
    let json = serde_json::to_string(&log).expect("serialize");
    let back: UsageLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(log, back);
}
