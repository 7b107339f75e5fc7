// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent Runner: `Run(agent, project, contextBundle) →
//! AgentResult`. Builds the three-part message, streams the provider's
//! reply as `conversation_chunk` events, applies optional compression,
//! and on completion emits `conversation_update`, appends a
//! `ConversationMessage`, and records a `UsageRecord`.

use crate::assembly::{assemble, assemble_with_compression};
use crate::compression::CompressionTransform;
use crate::output::{parse_output, AgentOutput};
use crate::provider::{ChatProvider, ChatRequest, ProviderError, StreamEvent};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tumbler_core::{
    AgentContext, AgentRole, CompressionConfig, ConversationMessage, Event, MessageRole, UsageRecord,
};
use tumbler_eventbus::EventBus;
use tumbler_storage::{StateStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AgentRunError {
    /// Cooperative cancellation fired before the stream completed. No `ConversationMessage` is produced for this call.
    #[error("agent run cancelled")]
    Cancelled,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything `Run` returns to its caller: the
/// full text, token/cost accounting, and the role-specific parsed artifact.
#[derive(Debug, Clone)]
pub struct AgentResult {
    pub text: String,
    pub output: AgentOutput,
    pub usage: UsageRecord,
}

/// One invocation of an agent. `model` selects the model string sent to
/// the provider (resolved by the caller from `provider_overrides` /
/// defaults, per the documented contract); `compression` is consulted only when
/// `compression.enabled`.
pub struct RunRequest<'a> {
    pub project: &'a str,
    pub role: AgentRole,
    pub iteration: u32,
    pub context: &'a AgentContext,
    pub model: &'a str,
    pub compression: &'a CompressionConfig,
}

/// Run one agent invocation to completion, publishing events and
/// persisting conversation/usage as it goes.
///
/// `cancel` is checked at each streamed fragment; when it fires before the
/// stream completes, any partial text is discarded — no `ConversationMessage`
/// is appended, but any `conversation_chunk` events already published stand
///.
pub async fn run(
    store: &StateStore,
    bus: &EventBus,
    provider: &dyn ChatProvider,
    transform: &dyn CompressionTransform,
    request: RunRequest<'_>,
    cancel: &CancellationToken,
) -> Result<AgentResult, AgentRunError> {
    let messages = if request.compression.enabled {
        assemble_with_compression(request.role, request.iteration, request.context, transform)
    } else {
        assemble(request.role, request.iteration, request.context)
    };

    bus.publish(Event::AgentThinking {
            project: request.project.to_string(),
            agent: request.role,
            iteration: request.iteration,
            timestamp: chrono::Utc::now(),
    })
    .await;

    let chat_request = ChatRequest { model: request.model.to_string(), messages };
    let mut stream = provider.chat_stream(chat_request).await?;

    let mut text = String::new();
    let mut input_tokens = 0u32;
    let mut output_tokens = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentRunError::Cancelled),
            next = stream.next() => {
                match next {
                    None => break,
                    Some(Err(error)) => return Err(AgentRunError::Provider(error)),
                    Some(Ok(StreamEvent::Delta(fragment))) => {
                        text.push_str(&fragment);
                        bus.publish(Event::ConversationChunk {
                                project: request.project.to_string(),
                                agent: request.role,
                                chunk: fragment,
                                timestamp: chrono::Utc::now(),
                        })
                        .await;
                    }
                    Some(Ok(StreamEvent::Done { input_tokens: i, output_tokens: o })) => {
                        input_tokens = i;
                        output_tokens = o;
                    }
                }
            }
        }
    }

    let output = parse_output(request.role, &text);
    let usage = UsageRecord {
        timestamp: chrono::Utc::now(),
        agent: request.role,
        iteration: request.iteration,
        input_tokens: u64::from(input_tokens),
        output_tokens: u64::from(output_tokens),
        cost: provider.model_info(request.model).cost(input_tokens, output_tokens),
        provider_id: provider.id().to_string(),
    };

    // Emitting `conversation_update` implicitly clears any outstanding
    // `agent_thinking` indicator for this (project, agent).
    bus.publish(Event::ConversationUpdate {
            project: request.project.to_string(),
            agent: request.role,
            iteration: request.iteration,
            content: text.clone(),
            timestamp: chrono::Utc::now(),
    })
    .await;

    store.append_conversation(
        request.project,
        ConversationMessage::new(request.role, MessageRole::Output, request.iteration, text.clone()),
    )?;
    store.append_usage(request.project, usage.clone())?;
    bus.publish(Event::UsageUpdate {
            project: request.project.to_string(),
            record: usage.clone(),
            timestamp: chrono::Utc::now(),
    })
    .await;

    Ok(AgentResult { text, output, usage })
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
