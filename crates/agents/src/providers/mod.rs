// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete `ChatProvider` implementations (spec §9 "Variants include:
//! local HTTP (Ollama/vLLM), OpenAI-compatible HTTPS, Anthropic HTTPS,
//! Gemini HTTPS").

pub mod anthropic;
pub mod gemini;
pub mod openai_compatible;
mod sse;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai_compatible::OpenAiCompatibleProvider;
