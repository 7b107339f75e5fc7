// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the Architect's `PLAN.md` for the fenced command blocks the
//! Sandbox Executor consults.
//!
//! ```text
//! Install Commands:
//! ```bash
//! <cmd>
//! <cmd>
//! ```
//! ```
//!
//! Recognized keys: `Install Commands`, `Build Commands`, `Test Commands`,
//! `Run Commands`. Lint is never parsed from the plan.

use regex::Regex;
use std::sync::LazyLock;
use tumbler_core::SandboxStrategy;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?im)^(Install|Build|Test|Run) Commands:\s*\n```[^\n]*\n([\s\S]*?)\n```").expect("static pattern")
});

/// Extract a [`SandboxStrategy`] from `plan` markdown. Keys absent from the
/// text leave the corresponding field empty, letting the sandbox fall back
/// to the detected runtime's defaults.
pub fn parse_plan_commands(plan: &str) -> SandboxStrategy {
    let mut strategy = SandboxStrategy::default();
    for capture in FENCED_BLOCK.captures_iter(plan) {
        let key = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = capture.get(2).map(|m| m.as_str()).unwrap_or_default();
        let commands: Vec<String> = body.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect();
        match key.to_ascii_lowercase().as_str() {
            "install" => strategy.install_commands = commands,
            "build" => strategy.build_commands = commands,
            "test" => strategy.test_commands = commands,
            "run" => strategy.run_commands = commands,
            _ => {}
        }
    }
    strategy
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
