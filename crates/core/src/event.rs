// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Everything the Event Bus carries.

use crate::conversation::AgentRole;
use crate::phase::{FailureReason, Phase};
use crate::sandbox::{PhaseStatus, SandboxPhase};
use crate::usage::UsageRecord;

/// A single published event. `#[serde(tag = "type")]` mirrors the external
/// wire shape from the documented contract: `{type, timestamp, data: {...}}` is reconstructed
/// by consumers projecting this value; internally the fields sit flat for a
/// direct serde derive, same shape the teacher's own `Event` enum uses.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "phase_change")]
    PhaseChange {
        project: String,
        phase: Phase,
        iteration: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "iteration_update")]
    IterationUpdate { project: String, iteration: u32, timestamp: chrono::DateTime<chrono::Utc> },
    #[serde(rename = "agent_thinking")]
    AgentThinking {
        project: String,
        agent: AgentRole,
        iteration: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "conversation_chunk")]
    ConversationChunk {
        project: String,
        agent: AgentRole,
        chunk: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "conversation_update")]
    ConversationUpdate {
        project: String,
        agent: AgentRole,
        iteration: u32,
        content: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "sandbox_start")]
    SandboxStart { project: String, iteration: u32, timestamp: chrono::DateTime<chrono::Utc> },
    #[serde(rename = "sandbox_phase")]
    SandboxPhase {
        project: String,
        iteration: u32,
        phase: SandboxPhase,
        status: PhaseStatus,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
        duration_s: f64,
        commands: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "score_update")]
    ScoreUpdate {
        project: String,
        iteration: u32,
        score: f64,
        phase: Phase,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "usage_update")]
    UsageUpdate { project: String, record: UsageRecord, timestamp: chrono::DateTime<chrono::Utc> },
    #[serde(rename = "project_complete")]
    ProjectComplete {
        project: String,
        iteration: u32,
        score: f64,
        archive_path: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename = "project_failed")]
    ProjectFailed { project: String, reason: FailureReason, timestamp: chrono::DateTime<chrono::Utc> },
    #[serde(rename = "log")]
    Log {
        project: Option<String>,
        level: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Forward-compatibility catch-all for event kinds this build does not
    /// know about yet; never produced, never re-serialized.
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    /// The project this event belongs to, if any (`log` may be process-wide).
    pub fn project(&self) -> Option<&str> {
        match self {
            Event::PhaseChange { project, .. }
            | Event::IterationUpdate { project, .. }
            | Event::AgentThinking { project, .. }
            | Event::ConversationChunk { project, .. }
            | Event::ConversationUpdate { project, .. }
            | Event::SandboxStart { project, .. }
            | Event::SandboxPhase { project, .. }
            | Event::ScoreUpdate { project, .. }
            | Event::UsageUpdate { project, .. }
            | Event::ProjectComplete { project, .. }
            | Event::ProjectFailed { project, .. } => Some(project.as_str()),
            Event::Log { project, .. } => project.as_deref(),
            Event::Custom => None,
        }
    }

    /// The wire `type` tag, for subscriber filters by event type (§4.2).
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PhaseChange { .. } => "phase_change",
            Event::IterationUpdate { .. } => "iteration_update",
            Event::AgentThinking { .. } => "agent_thinking",
            Event::ConversationChunk { .. } => "conversation_chunk",
            Event::ConversationUpdate { .. } => "conversation_update",
            Event::SandboxStart { .. } => "sandbox_start",
            Event::SandboxPhase { .. } => "sandbox_phase",
            Event::ScoreUpdate { .. } => "score_update",
            Event::UsageUpdate { .. } => "usage_update",
            Event::ProjectComplete { .. } => "project_complete",
            Event::ProjectFailed { .. } => "project_failed",
            Event::Log { .. } => "log",
            Event::Custom => "custom",
        }
    }

    /// Terminal events must be delivered in order and never dropped (§4.2).
    /// Everything else (chiefly `conversation_chunk`) is lossy under backpressure.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::PhaseChange { .. }
            | Event::ScoreUpdate { .. }
            | Event::ProjectComplete { .. }
            | Event::ProjectFailed { .. }
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
