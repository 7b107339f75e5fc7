// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables the spec leaves as "implementers should expose this as
//! configuration".

use std::collections::HashMap;
use std::time::Duration;
use tumbler_core::AgentRole;

/// Loop-wide knobs, shared across every project the engine drives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    /// Retries of the same iteration after an `AgentError` before the
    /// project is marked failed.
    pub agent_retry_limit: u32,
    /// Per-project wall-clock timeout.
    pub project_timeout: Duration,
    /// Debounce window for file-watcher triggers.
    pub watcher_debounce: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            agent_retry_limit: 1,
            project_timeout: Duration::from_secs(3600),
            watcher_debounce: Duration::from_secs(2),
        }
    }
}

/// Which provider and model one agent role calls by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRoleConfig {
    pub provider_id: String,
    pub model: String,
}

/// Default provider/model per role. A project's `provider_overrides` (spec
/// §3) replaces only the provider id, keeping the role's default model
/// string — there is no per-project model override in the data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub architect: AgentRoleConfig,
    pub engineer: AgentRoleConfig,
    pub verifier: AgentRoleConfig,
}

impl ModelConfig {
    /// Resolve the provider/model for `role`, applying `overrides` if present.
    pub fn resolve(&self, role: AgentRole, overrides: &HashMap<AgentRole, String>) -> AgentRoleConfig {
        let base = match role {
            AgentRole::Architect => &self.architect,
            AgentRole::Engineer => &self.engineer,
            AgentRole::Verifier | AgentRole::System => &self.verifier,
        };
        match overrides.get(&role) {
            Some(provider_id) => AgentRoleConfig { provider_id: provider_id.clone(), model: base.model.clone() },
            None => base.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
