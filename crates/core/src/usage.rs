// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call token/cost accounting.

use crate::conversation::AgentRole;
use std::collections::HashMap;

/// One agent call's accounting entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UsageRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub agent: AgentRole,
    pub iteration: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub provider_id: String,
}

/// Running totals, aggregated per agent, over a project's full history.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgentTotals {
    pub calls: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

/// The full contents of `.tumbler/usage.json`: per-agent totals plus full history.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UsageLog {
    #[serde(default)]
    pub by_agent: HashMap<AgentRole, AgentTotals>,
    #[serde(default)]
    pub history: Vec<UsageRecord>,
    #[serde(default)]
    pub total_cost: f64,
}

impl UsageLog {
    pub fn append(&mut self, record: UsageRecord) {
        let totals = self.by_agent.entry(record.agent).or_default();
        totals.calls += 1;
        totals.input_tokens += record.input_tokens;
        totals.output_tokens += record.output_tokens;
        totals.cost += record.cost;
        self.total_cost += record.cost;
        self.history.push(record);
    }
}

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
