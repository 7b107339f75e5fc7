// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic metric scoring of a [`tumbler_core::SandboxResult`] (spec
//! §4.4's point table).

use crate::parsing::{lint_issue_count, test_counts};
use tumbler_core::{PhaseStatus, SandboxPhase, SandboxResult};

/// Per-component point breakdown, summed for the overall metric score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBreakdown {
    pub build: f64,
    pub tests: f64,
    pub lint: f64,
    pub no_critical_errors: f64,
}

impl MetricBreakdown {
    pub fn total(&self) -> f64 {
        self.build + self.tests + self.lint + self.no_critical_errors
    }
}

/// Score a completed sandbox run per the table: Build 3, Tests
/// `4 * passed/total`, Lint 2/1/0 by issue count, No-critical-errors 1.
pub fn metric_score(result: &SandboxResult) -> MetricBreakdown {
    let build = if phase_passed(result, SandboxPhase::Install) && phase_passed(result, SandboxPhase::Build) {
        3.0
    } else {
        0.0
    };

    let tests = test_counts(&result.test.stdout)
    .filter(|counts| counts.total > 0)
    .map(|counts| 4.0 * (f64::from(counts.passed) / f64::from(counts.total)))
    .unwrap_or(0.0);

    let issues = lint_issue_count(&result.lint.stdout);
    let lint = if issues == 0 { 2.0 } else if issues < 5 { 1.0 } else { 0.0 };

    let no_critical_errors = if has_critical_errors(result) { 0.0 } else { 1.0 };

    MetricBreakdown { build, tests, lint, no_critical_errors }
}

fn phase_passed(result: &SandboxResult, phase: SandboxPhase) -> bool {
    result.phase(phase).exit_ok()
}

/// A failed (not merely lint/test-finding) install/build phase, or any
/// phase that timed out, counts as a critical runtime error.
fn has_critical_errors(result: &SandboxResult) -> bool {
    [result.install.status, result.build.status, result.test.status, result.lint.status]
    .iter()
    .any(|status| matches!(status, Some(PhaseStatus::Timeout)))
    || matches!(result.install.status, Some(PhaseStatus::Failed))
    || matches!(result.build.status, Some(PhaseStatus::Failed))
}

#[cfg(test)]
#[path = "metric_tests.rs"]
mod tests;
