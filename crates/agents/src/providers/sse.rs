// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal server-sent-events line framing shared by the streaming HTTP
//! providers.

use futures::stream::{BoxStream, StreamExt};
use reqwest::Response;

#[derive(Debug, Clone)]
pub struct SseEvent {
    pub data: String,
}

/// Turn a chunked HTTP response into a stream of `data:` payloads,
/// buffering partial lines across network reads. A payload of `[DONE]` is
/// consumed but not yielded.
pub fn parse_sse_stream(response: Response) -> BoxStream<'static, Result<SseEvent, reqwest::Error>> {
    let byte_stream = response.bytes_stream();
    let buffer = String::new();

    let stream = futures::stream::unfold((byte_stream, buffer), |(mut byte_stream, mut buffer)| async move {
            loop {
                if let Some(pos) = buffer.find("\n\n") {
                    let event_text = buffer[..pos].to_string();
                    buffer = buffer[pos + 2..].to_string();
                    if let Some(event) = parse_event(&event_text) {
                        return Some((Ok(event), (byte_stream, buffer)));
                    }
                    continue;
                }

                match byte_stream.next().await {
                    Some(Ok(bytes)) => buffer.push_str(&String::from_utf8_lossy(&bytes)),
                    Some(Err(error)) => return Some((Err(error), (byte_stream, buffer))),
                    None => return None,
                }
            }
    });

    Box::pin(stream)
}

fn parse_event(text: &str) -> Option<SseEvent> {
    let mut data_lines = Vec::new();
    for line in text.lines() {
        if let Some(value) = line.strip_prefix("data: ") {
            data_lines.push(value);
        } else if line == "data:" {
            data_lines.push("");
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    let data = data_lines.join("\n");
    if data == "[DONE]" {
        return None;
    }
    Some(SseEvent { data })
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
