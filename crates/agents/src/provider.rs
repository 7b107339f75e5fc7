// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The streaming chat interface every concrete provider implements (spec
//! §9 "Dynamic tool/provider factory") and the registry that maps a
//! provider id to one.

use futures::stream::BoxStream;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {0} is not registered")]
    UnknownProvider(String),
    #[error("request to provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed stream event: {0}")]
    MalformedEvent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// One fragment of a streamed reply, or the terminal usage summary.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Delta(String),
    Done { input_tokens: u32, output_tokens: u32 },
}

/// Pricing and identity for one model a provider can serve. Used to turn a
/// completed call's token counts into a `UsageRecord.cost`.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub input_price_per_m: f64,
    pub output_price_per_m: f64,
}

impl ModelInfo {
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input = f64::from(input_tokens) / 1_000_000.0 * self.input_price_per_m;
        let output = f64::from(output_tokens) / 1_000_000.0 * self.output_price_per_m;
        input + output
    }
}

/// Capability metadata consulted by the Agent Runner rather than runtime
/// reflection.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub supports_async: bool,
    pub concurrency_limit: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { supports_async: false, concurrency_limit: 1 }
    }
}

#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> &str;
    fn capabilities(&self) -> Capabilities;
    fn model_info(&self, model: &str) -> ModelInfo;

    async fn chat_stream(&self, request: ChatRequest) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError>;
}

/// Maps a provider id
/// to the concrete client that serves it.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn ChatProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn get(&self, provider_id: &str) -> Result<Arc<dyn ChatProvider>, ProviderError> {
        self.providers.get(provider_id).cloned().ok_or_else(|| ProviderError::UnknownProvider(provider_id.to_string()))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
