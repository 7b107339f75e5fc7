// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gemini `streamGenerateContent` client (spec §9 "Gemini HTTPS"), requested
//! with `alt=sse` so the wire format matches the other streaming providers.

use crate::provider::{Capabilities, ChatProvider, ChatRequest, ChatRole, ModelInfo, ProviderError, StreamEvent};
use crate::providers::sse::parse_sse_stream;
use futures::stream::{BoxStream, StreamExt};
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    input_price_per_m: f64,
    output_price_per_m: f64,
}

impl GeminiProvider {
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
        let contents: Vec<serde_json::Value> = request
        .messages
        .iter()
        .filter(|m| m.role != ChatRole::System)
        .map(|m| {
                let role = if m.role == ChatRole::Assistant { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();
        let mut body = json!({"contents": contents});
        if !system.is_empty() {
            body["systemInstruction"] = json!({"parts": [{"text": system.join("\n\n")}]});
        }
        body
    }
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    fn id(&self) -> &str {
        "gemini"
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
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, request.model, self.api_key
        );
        let response = self.client.post(url).json(&body).send().await?;
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
                if let Some(usage) = parsed.get("usageMetadata") {
                    let input_tokens = usage.get("promptTokenCount").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                    let output_tokens = usage.get("candidatesTokenCount").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
                    return Some(Ok(StreamEvent::Done { input_tokens, output_tokens }));
                }
                let text = parsed.pointer("/candidates/0/content/parts/0/text").and_then(|v| v.as_str());
                text.map(|t| Ok(StreamEvent::Delta(t.to_string())))
        });

        Ok(Box::pin(events))
    }
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
