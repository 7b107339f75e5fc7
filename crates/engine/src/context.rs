// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the `contextBundle` passed to each agent per iteration (spec
//! §4.6 "Context passed to each agent per iteration").

use tumbler_core::{AgentContext, FileEntry, SandboxResult};

/// Architect: iteration 0 sees only the requirements; iteration ≥ 1 (a
/// revision request after a failed Verifier pass) additionally sees the
/// previous plan and feedback report.
pub fn architect_context(requirements: &str, previous_plan: Option<&str>, previous_feedback: Option<&str>) -> AgentContext {
    AgentContext {
        requirements: Some(requirements.to_string()),
        previous_plan: previous_plan.map(str::to_string),
        previous_feedback: previous_feedback.map(str::to_string),
        ..Default::default()
    }
}

/// Engineer: always sees the current plan. From iteration ≥ 2 it also sees
/// the previous staging listing (with contents) and the previous feedback
/// report, so it can make a targeted revision rather than starting fresh.
pub fn engineer_context(
    iteration: u32,
    current_plan: &str,
    previous_staging: Option<&[FileEntry]>,
    previous_feedback: Option<&str>,
) -> AgentContext {
    let revising = iteration >= 2;
    AgentContext {
        current_plan: Some(current_plan.to_string()),
        previous_staging: if revising { previous_staging.map(<[FileEntry]>::to_vec) } else { None },
        previous_feedback: if revising { previous_feedback.map(str::to_string) } else { None },
        ..Default::default()
    }
}

/// Verifier: the plan, the full (uncompressed) sandbox phase output, and
/// the generated code listing. `static_review_only` is set when the
/// sandbox could not run at all.
pub fn verifier_context(current_plan: &str, sandbox_result: Option<SandboxResult>, code_listing: Vec<FileEntry>) -> AgentContext {
    let static_review_only = sandbox_result.as_ref().map(|r| !r.available).unwrap_or(true);
    AgentContext {
        current_plan: Some(current_plan.to_string()),
        sandbox_result,
        code_listing: Some(code_listing),
        static_review_only,
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "context_engine_tests.rs"]
mod tests;
