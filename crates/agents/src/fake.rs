// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scripted provider for tests that exercise the runner without a real
//! network call — the `test-support` counterpart to `tumbler_core`'s
//! `FakeClock`.

use crate::provider::{Capabilities, ChatProvider, ChatRequest, ModelInfo, ProviderError, StreamEvent};
use futures::stream::BoxStream;
use parking_lot::Mutex;

/// Replays a fixed sequence of text fragments, then a `Done` with the given
/// token counts. Useful for asserting the runner's assembly/streaming/
/// cancellation behavior without a live provider.
pub struct FakeProvider {
    id: String,
    fragments: Vec<String>,
    input_tokens: u32,
    output_tokens: u32,
    capabilities: Capabilities,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeProvider {
    pub fn new(id: impl Into<String>, fragments: Vec<String>, input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            id: id.into(),
            fragments,
            input_tokens,
            output_tokens,
            capabilities: Capabilities::default(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The requests this provider has seen so far, for assembly assertions.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl ChatProvider for FakeProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn model_info(&self, model: &str) -> ModelInfo {
        ModelInfo { id: model.to_string(), input_price_per_m: 0.0, output_price_per_m: 0.0 }
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<BoxStream<'static, Result<StreamEvent, ProviderError>>, ProviderError> {
        self.requests.lock().push(request);
        let mut events: Vec<Result<StreamEvent, ProviderError>> =
        self.fragments.iter().cloned().map(|f| Ok(StreamEvent::Delta(f))).collect();
        events.push(Ok(StreamEvent::Done { input_tokens: self.input_tokens, output_tokens: self.output_tokens }));
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
