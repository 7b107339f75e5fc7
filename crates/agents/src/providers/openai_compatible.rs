// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One client for every provider that speaks the OpenAI `chat/completions`
//! wire format: local HTTP (Ollama/vLLM) and OpenAI-compatible HTTPS both
//! reduce to this with a different base URL and an optional bearer token
//! (spec §9 "Variants include: local HTTP..., OpenAI-compatible HTTPS...").

use crate::provider::{
    Capabilities, ChatProvider, ChatRequest, ChatRole, ModelInfo, ProviderError, StreamEvent,
};
use crate::providers::sse::parse_sse_stream;
use futures::stream::{BoxStream, StreamExt};
use serde_json::json;
use std::time::Duration;

pub struct OpenAiCompatibleProvider {
    id: String,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    capabilities: Capabilities,
    input_price_per_m: f64,
    output_price_per_m: f64,
}

impl OpenAiCompatibleProvider {
    /// A locally-hosted OpenAI-compatible server (Ollama, vLLM): no auth,
    /// zero-cost pricing since there is no metered API behind it.
    pub fn local(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client: build_client(),
            base_url: base_url.into(),
            api_key: None,
            capabilities: Capabilities { supports_async: true, concurrency_limit: 4 },
            input_price_per_m: 0.0,
            output_price_per_m: 0.0,
        }
    }

    /// A hosted OpenAI-compatible HTTPS endpoint, bearer-authenticated.
    pub fn hosted(
        id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        input_price_per_m: f64,
        output_price_per_m: f64,
    ) -> Self {
        Self {
            id: id.into(),
            client: build_client(),
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            capabilities: Capabilities { supports_async: true, concurrency_limit: 8 },
            input_price_per_m,
            output_price_per_m,
        }
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder().timeout(Duration::from_secs(120)).build().unwrap_or_default()
}

fn role_str(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn model_info(&self, model: &str) -> ModelInfo {
        ModelInfo {
            id: model.to_string(),
            input_price_per_m: self.input_price_per_m,
            output_price_per_m: self.output_price_per_m,
        }
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|m| json!({"role": role_str(m.role), "content": m.content}))
        .collect();
        let body = json!({
                "model": request.model,
                "messages": messages,
                "stream": true,
                "stream_options": {"include_usage": true},
        });

        let mut builder = self.client.post(format!("{}/chat/completions", self.base_url)).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let events = parse_sse_stream(response).filter_map(|event| async move {
                let event = match event {
                    Ok(event) => event,
                    Err(error) => return Some(Err(ProviderError::Request(error))),
                };
                let parsed: serde_json::Value = match serde_json::from_str(&event.data) {
                    Ok(value) => value,
                    Err(_) => return Some(Err(ProviderError::MalformedEvent(event.data))),
                };
                if let Some(usage) = parsed.get("usage") {
                    let input_tokens = usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                    let output_tokens = usage.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                    return Some(Ok(StreamEvent::Done { input_tokens, output_tokens }));
                }
                let delta = parsed
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("delta"))
                .and_then(|d| d.get("content"))
                .and_then(|c| c.as_str())
                .unwrap_or("");
                if delta.is_empty() {
                    None
                } else {
                    Some(Ok(StreamEvent::Delta(delta.to_string())))
                }
        });

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
#[path = "openai_compatible_tests.rs"]
mod tests;
