// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `contextBundle` argument to `AgentRunner::run`.

use crate::sandbox::SandboxResult;

/// One file as seen by the Engineer or Verifier (`03_staging/` listing).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

/// Everything an agent invocation needs assembled for it, varying by role
/// and iteration per the table in the documented contract:
///
/// - Architect (iter 0): `requirements` only. Iter ≥ 1: + `previous_plan` + `previous_feedback`.
/// - Engineer: `current_plan` + (iter ≥ 2) `previous_staging` + `previous_feedback`.
/// - Verifier: `current_plan` + `sandbox_result` + `code_listing`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AgentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_staging: Option<Vec<FileEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_result: Option<SandboxResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_listing: Option<Vec<FileEntry>>,
    /// Set when `Sandbox.Run` returned `SandboxUnavailable`: the Verifier is
    /// told explicitly that static review is the only available signal
    ///.
    #[serde(default)]
    pub static_review_only: bool,
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
