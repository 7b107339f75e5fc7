// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project lifecycle phase and terminal failure reasons.

/// Current stage of a project's state machine.
///
/// Exactly one variant is current for a given project at any time; see
/// [`Project::validate`](crate::project::Project::validate) for the invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Planning,
    Engineering,
    Verifying,
    Completed,
    Failed,
}

impl Phase {
    /// `completed` and `failed` are terminal; no further agent iterations occur from them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }

    /// `is_running` implies the phase is one of these three (data model invariant).
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Planning | Phase::Engineering | Phase::Verifying)
    }
}

crate::simple_display! {
    Phase {
        Idle => "idle",
        Planning => "planning",
        Engineering => "engineering",
        Verifying => "verifying",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Why a project settled into `Phase::Failed`.
///
/// Mirrors the terminal entries of the error taxonomy: `AgentError`,
/// `BudgetExceeded` (`CostCap`), `IterationCap`, per-project wall-clock
/// timeout, and unexpected internal errors.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    AgentError { message: String },
    CostCap { total_cost: f64, max_cost: f64 },
    IterationCap { iteration: u32, max_iterations: u32 },
    Timeout { elapsed_secs: u64 },
    Internal { message: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::AgentError { message } => write!(f, "agent error: {message}"),
            FailureReason::CostCap { total_cost, max_cost } => {
                write!(f, "cost cap exceeded: {total_cost:.4} >= {max_cost:.4}")
            }
            FailureReason::IterationCap { iteration, max_iterations } => {
                write!(f, "iteration cap reached: {iteration}/{max_iterations}")
            }
            FailureReason::Timeout { elapsed_secs } => {
                write!(f, "project timed out after {elapsed_secs}s")
            }
            FailureReason::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
