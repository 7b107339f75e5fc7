// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roles and the append-only conversation log.

/// A named role wrapping a single LLM invocation with role-specific message
/// assembly and output parsing (spec GLOSSARY "Agent").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Architect,
    Engineer,
    Verifier,
    System,
}

crate::simple_display! {
    AgentRole {
        Architect => "architect",
        Engineer => "engineer",
        Verifier => "verifier",
        System => "system",
    }
}

/// The kind of content a `ConversationMessage` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Input,
    Output,
    Error,
    Status,
    Sandbox,
}

crate::simple_display! {
    MessageRole {
        Input => "input",
        Output => "output",
        Error => "error",
        Status => "status",
        Sandbox => "sandbox",
    }
}

/// Sandbox-specific metadata attached to a `Sandbox`-role conversation entry.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SandboxMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
}

/// Optional structured metadata alongside a conversation entry's free text.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxMeta>,
}

/// One entry of the append-only `.tumbler/conversation.json` log.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConversationMessage {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub agent: AgentRole,
    pub role: MessageRole,
    pub iteration: u32,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ConversationMessage {
    pub fn new(agent: AgentRole, role: MessageRole, iteration: u32, content: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            agent,
            role,
            iteration,
            content: content.into(),
            metadata: None,
        }
    }

    /// Construct with an explicit timestamp, for callers threading a [`crate::Clock`].
    pub fn new_at(
        timestamp: chrono::DateTime<chrono::Utc>,
        agent: AgentRole,
        role: MessageRole,
        iteration: u32,
        content: impl Into<String>,
    ) -> Self {
        Self { timestamp, agent, role, iteration, content: content.into(), metadata: None }
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
