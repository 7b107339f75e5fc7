// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Three-part message assembly and the
//! system prompt text per role.

use crate::compression::CompressionTransform;
use crate::provider::{ChatMessage, ChatRole};
use tumbler_core::{AgentContext, AgentRole, FileEntry};

/// Sections inside these markers are eligible for compression by the
/// (out-of-scope) compression subsystem; the markers are stripped before
/// transmission and never themselves sent to a provider.
const COMPRESS_OPEN: &str = "<compress>";
const COMPRESS_CLOSE: &str = "</compress>";

/// Build the three-part `[system_prompt, context_with_markers,
/// task_instruction]` structure for one agent invocation, with compression
/// markers stripped. Sandbox output, errors, and the task instruction are
/// assembled outside any markers and so are never eligible for
/// compression, per spec.
pub fn assemble(role: AgentRole, iteration: u32, context: &AgentContext) -> Vec<ChatMessage> {
    let system_prompt = system_prompt_for(role);
    let context_section = strip_compression_markers(&context_with_markers(role, context));
    let task_instruction = task_instruction_for(role, iteration);

    vec![
        ChatMessage { role: ChatRole::System, content: system_prompt.to_string() },
        ChatMessage { role: ChatRole::User, content: context_section },
        ChatMessage { role: ChatRole::User, content: task_instruction },
    ]
}

fn system_prompt_for(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Architect => {
            "You are the Architect. Read the requirements and produce a clear, \
            actionable implementation plan as Markdown."
        }
        AgentRole::Engineer => {
            "You are the Engineer. Implement the plan exactly. Respond with a \
            JSON array of {\"path\": ..., \"content\": ...} objects and nothing else."
        }
        AgentRole::Verifier => {
            "You are the Verifier. Review the plan, the sandbox phase results, \
            and the generated code. Respond with a report ending in the line \
            \"Overall Score: X/10\"."
        }
        AgentRole::System => "You are a system agent.",
    }
}

/// The context body, with compressible sections wrapped in markers. The
/// requirements/plan/feedback history is eligible for compression; sandbox
/// output and code listings are placed outside the markers.
fn context_with_markers(role: AgentRole, context: &AgentContext) -> String {
    let mut sections = Vec::new();

    match role {
        AgentRole::Architect => {
            if let Some(requirements) = &context.requirements {
                sections.push(compressible("Requirements", requirements));
            }
            if let Some(previous_plan) = &context.previous_plan {
                sections.push(compressible("Previous plan", previous_plan));
            }
            if let Some(previous_feedback) = &context.previous_feedback {
                sections.push(compressible("Previous feedback", previous_feedback));
            }
        }
        AgentRole::Engineer => {
            if let Some(plan) = &context.current_plan {
                sections.push(compressible("Plan", plan));
            }
            if let Some(staging) = &context.previous_staging {
                sections.push(uncompressed("Previous staging", &render_files(staging)));
            }
            if let Some(previous_feedback) = &context.previous_feedback {
                sections.push(compressible("Previous feedback", previous_feedback));
            }
        }
        AgentRole::Verifier => {
            if let Some(plan) = &context.current_plan {
                sections.push(compressible("Plan", plan));
            }
            if context.static_review_only {
                sections.push(uncompressed(
                    "Sandbox",
                    "Sandbox execution was unavailable for this iteration; this is a static code review only.",
                ));
            } else if let Some(result) = &context.sandbox_result {
                sections.push(uncompressed("Sandbox results", &render_sandbox_result(result)));
            }
            if let Some(listing) = &context.code_listing {
                sections.push(uncompressed("Code listing", &render_files(listing)));
            }
        }
        AgentRole::System => {}
    }

    sections.join("\n\n")
}

fn compressible(label: &str, body: &str) -> String {
    format!("## {label}\n{COMPRESS_OPEN}\n{body}\n{COMPRESS_CLOSE}")
}

fn uncompressed(label: &str, body: &str) -> String {
    format!("## {label}\n{body}")
}

fn render_files(files: &[FileEntry]) -> String {
    files.iter().map(|f| format!("### {}\n```\n{}\n```", f.path, f.content)).collect::<Vec<_>>().join("\n\n")
}

fn render_sandbox_result(result: &tumbler_core::SandboxResult) -> String {
    use tumbler_core::SandboxPhase;
    [SandboxPhase::Install, SandboxPhase::Build, SandboxPhase::Test, SandboxPhase::Lint]
        .iter()
        .map(|phase| {
            let outcome = result.phase(*phase);
            format!(
                "### {phase}\nstatus: {:?}\nstdout:\n{}\nstderr:\n{}",
                outcome.status, outcome.stdout, outcome.stderr
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn task_instruction_for(role: AgentRole, iteration: u32) -> String {
    match role {
        AgentRole::Architect if iteration == 0 => "Produce the implementation plan.".to_string(),
        AgentRole::Architect => "Revise the plan in light of the previous feedback.".to_string(),
        AgentRole::Engineer => "Produce the file list implementing the current plan.".to_string(),
        AgentRole::Verifier => "Review the work and report an Overall Score out of 10.".to_string(),
        AgentRole::System => String::new(),
    }
}

fn strip_compression_markers(text: &str) -> String {
    text.replace(COMPRESS_OPEN, "").replace(COMPRESS_CLOSE, "")
}

/// The compression-aware counterpart to [`assemble`], used when a
/// project's `compression_config.enabled` is set. Sections inside `<compress>` markers are run
/// through `transform`; everything else (the task instruction, and
/// anything a role places outside markers) is untouched.
pub fn assemble_with_compression(
    role: AgentRole,
    iteration: u32,
    context: &AgentContext,
    transform: &dyn CompressionTransform,
) -> Vec<ChatMessage> {
    let system_prompt = system_prompt_for(role);
    let compressed_context = apply_compression(&context_with_markers(role, context), transform);
    let task_instruction = task_instruction_for(role, iteration);

    vec![
        ChatMessage { role: ChatRole::System, content: system_prompt.to_string() },
        ChatMessage { role: ChatRole::User, content: compressed_context },
        ChatMessage { role: ChatRole::User, content: task_instruction },
    ]
}

/// Replace the body of each `<compress>...</compress>` section with
/// `transform.compress(body)`, then drop the markers themselves (spec
/// §4.5: "Markers themselves are stripped before transmission").
fn apply_compression(text: &str, transform: &dyn CompressionTransform) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(COMPRESS_OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + COMPRESS_OPEN.len()..];
        match after_open.find(COMPRESS_CLOSE) {
            Some(end) => {
                out.push_str(&transform.compress(&after_open[..end]));
                rest = &after_open[end + COMPRESS_CLOSE.len()..];
            }
            None => {
                out.push_str(after_open);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "assembly_tests.rs"]
mod tests;
