// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The commands the Feedback Loop emits for an `Executor` to interpret
//! against real collaborators (agents, sandbox, storage, event bus, clock).
//!
//! Mirrors the functional-core/imperative-shell split: loop logic is pure
//! and returns `Vec<Effect>`; only the executor performs I/O and feeds
//! resulting `Event`s back in.

use crate::context::AgentContext;
use crate::conversation::{AgentRole, ConversationMessage};
use crate::event::Event;
use crate::phase::FailureReason;
use crate::sandbox::{ResourceLimits, SandboxStrategy};
use crate::usage::UsageRecord;
use std::path::PathBuf;
use std::time::Duration;

/// A timer owned by a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Per-project wall-clock timeout.
    ProjectTimeout,
}

#[derive(Debug, Clone)]
pub enum Effect {
    /// Publish an event to the bus. Does not itself mutate state.
    Emit(Event),

    /// Invoke one agent for one iteration.
    RunAgent { project: String, agent: AgentRole, iteration: u32, context: Box<AgentContext> },

    /// Run install/build/test/lint in a sandbox.
    RunSandbox {
        project: String,
        iteration: u32,
        workspace: PathBuf,
        strategy: Box<SandboxStrategy>,
        resources: ResourceLimits,
    },

    /// Persist the in-memory `Project` to `.tumbler/state.json`.
    SaveState { project: String },

    /// Append to `.tumbler/usage.json`.
    AppendUsage { project: String, record: Box<UsageRecord> },

    /// Append to `.tumbler/conversation.json`.
    AppendConversation { project: String, message: Box<ConversationMessage> },

    /// Archive `03_staging/` to `05_final/{name}_{timestamp}.zip` on convergence
    ///.
    ArchiveStaging { project: String, iteration: u32 },

    /// Clear `02_plan/`, `03_staging/`, `04_feedback/`, usage and conversation
    /// logs, then reset in-memory project state.
    ResetProject { project: String },

    /// Remove the entire project root.
    DeleteProject { project: String },

    /// Arm a project-scoped timer. `id` disambiguates re-arms of the same
    /// `kind` so a stale fire can be told apart from the current one.
    SetTimer { project: String, kind: TimerKind, id: u64, duration: Duration },

    /// Disarm a previously-armed timer.
    CancelTimer { project: String, kind: TimerKind },

    /// Terminate a project's loop as `Failed` with the given reason, tearing
    /// down any in-flight sandbox or agent stream.
    FailProject { project: String, reason: FailureReason },
}

impl Effect {
    /// Stable name for structured logging, mirroring the teacher's
    /// `effect.name()` convention.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::RunAgent { .. } => "run_agent",
            Effect::RunSandbox { .. } => "run_sandbox",
            Effect::SaveState { .. } => "save_state",
            Effect::AppendUsage { .. } => "append_usage",
            Effect::AppendConversation { .. } => "append_conversation",
            Effect::ArchiveStaging { .. } => "archive_staging",
            Effect::ResetProject { .. } => "reset_project",
            Effect::DeleteProject { .. } => "delete_project",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::FailProject { .. } => "fail_project",
        }
    }

    /// Structured key-value fields for a tracing span, mirroring the
    /// teacher's `effect.fields()` convention. Kept terse; full payloads
    /// (agent context, sandbox output) are available via `verbose()`.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit(event) => vec![("event", event.kind().to_string())],
            Effect::RunAgent { project, agent, iteration, .. } => vec![
                ("project", project.clone()),
                ("agent", agent.to_string()),
                ("iteration", iteration.to_string()),
            ],
            Effect::RunSandbox { project, iteration, .. } => {
                vec![("project", project.clone()), ("iteration", iteration.to_string())]
            }
            Effect::SaveState { project }
            | Effect::ResetProject { project }
            | Effect::DeleteProject { project } => vec![("project", project.clone())],
            Effect::AppendUsage { project, .. } | Effect::AppendConversation { project, .. } => {
                vec![("project", project.clone())]
            }
            Effect::ArchiveStaging { project, iteration } => {
                vec![("project", project.clone()), ("iteration", iteration.to_string())]
            }
            Effect::SetTimer { project, kind, duration, .. } => vec![
                ("project", project.clone()),
                ("kind", format!("{kind:?}")),
                ("duration_ms", duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { project, kind } => {
                vec![("project", project.clone()), ("kind", format!("{kind:?}"))]
            }
            Effect::FailProject { project, reason } => {
                vec![("project", project.clone()), ("reason", reason.to_string())]
            }
        }
    }

    /// Full payload, logged only at verbose/trace levels (full agent context,
    /// sandbox stdout/stderr are large and usually undesirable at info level).
    pub fn verbose(&self) -> bool {
        matches!(self, Effect::RunAgent { .. } | Effect::RunSandbox { .. })
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
