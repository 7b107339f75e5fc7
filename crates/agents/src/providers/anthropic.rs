// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Anthropic Messages API client (spec §9 "Anthropic HTTPS").

use crate::provider::{Capabilities, ChatProvider, ChatRequest, ChatRole, ModelInfo, ProviderError, StreamEvent};
use crate::providers::sse::parse_sse_stream;
use futures::stream::{BoxStream, StreamExt};
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    input_price_per_m: f64,
    output_price_per_m: f64,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, input_price_per_m: f64, output_price_per_m: f64) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_secs(120)).build().unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            input_price_per_m,
            output_price_per_m,
        }
    }

    fn build_body(&self, request: &ChatRequest) -> serde_json::Value {
        let system: Vec<&str> =
        request.messages.iter().filter(|m| m.role == ChatRole::System).map(|m| m.content.as_str()).collect();
        let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .map(|m| {
                let role = if m.role == ChatRole::Assistant { "assistant" } else { "user" };
                json!({"role": role, "content": m.content})
        })
        .collect();
        json!({
                "model": request.model,
                "system": system.join("\n\n"),
                "messages": messages,
                "max_tokens": 8192,
                "stream": true,
        })
    }
}

#[async_trait::async_trait]
impl ChatProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { supports_async: true, concurrency_limit: 4 }
    }

    fn model_info(&self, model: &str) -> ModelInfo {
        ModelInfo { id: model.to_string(), input_price_per_m: self.input_price_per_m, output_price_per_m: self.output_price_per_m }
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        let body = self.build_body(&request);
        let response = self
        .client
        .post(format!("{}/messages", self.base_url))
        .header("x-api-key", &self.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&body)
        .send()
        .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let mut input_tokens = 0u32;
        let events = parse_sse_stream(response).filter_map(move |event| {
                let result = (|| -> Option<Result<StreamEvent, ProviderError>> {
                        let event = match event {
                            Ok(event) => event,
                            Err(error) => return Some(Err(ProviderError::Request(error))),
                        };
                        let parsed: serde_json::Value = serde_json::from_str(&event.data).ok()?;
                        match parsed.get("type").and_then(|t| t.as_str())? {
                            "message_start" => {
                                input_tokens = parsed
                                .pointer("/message/usage/input_tokens")
                                .and_then(|v| v.as_u64())
                                .unwrap_or(0) as u32;
                                None
                            }
                            "content_block_delta" => {
                                let text = parsed.pointer("/delta/text").and_then(|v| v.as_str())?;
                                Some(Ok(StreamEvent::Delta(text.to_string())))
                            }
                            "message_delta" => {
                                let output_tokens =
                                parsed.pointer("/usage/output_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                                Some(Ok(StreamEvent::Done { input_tokens, output_tokens }))
                            }
                            _ => None,
                        }
                })();
                async move { result }
        });

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
#[path = "anthropic_tests.rs"]
mod tests;
