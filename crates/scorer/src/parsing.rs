// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-count and lint-issue extraction from raw sandbox stdout.

use regex::Regex;
use std::sync::LazyLock;

/// Parsed test outcome: `passed` out of `total` (failures and errors make
/// up the remainder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCounts {
    pub passed: u32,
    pub total: u32,
}

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PYTEST_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)(?:(\d+)\s+passed)?(?:,?\s*(\d+)\s+failed)?(?:,?\s*(\d+)\s+error)?\s*(?:in\s+[\d.]+s)?")
        .expect("static pytest pattern")
});

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PYTEST_PASSED_ONLY: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+passed").expect("static pattern"));
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PYTEST_FAILED: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+failed").expect("static pattern"));
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PYTEST_ERRORED: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+error").expect("static pattern"));

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static JEST_TESTS_LINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)Tests:\s*(?:(\d+)\s+failed,?\s*)?(?:(\d+)\s+passed,?\s*)?(\d+)\s+total")
        .expect("static jest pattern")
});

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static GO_PASS_LINE: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?m)^\s*--- PASS:").expect("static pattern"));
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static GO_FAIL_LINE: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?m)^\s*--- FAIL:").expect("static pattern"));

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static GENERIC_FRACTION: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)\s+passed").expect("static pattern"));

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static LINT_LOCATION: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?m)^.+:\d+:\d+:").expect("static pattern"));
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static LINT_PROBLEMS_SUMMARY: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+problems?").expect("static pattern"));

/// Extract `(passed, total)` from a test runner's combined stdout, trying
/// each supported format in turn. Returns `None` if no test runner output
/// was recognized (spec: "0 if no tests reported").
pub fn test_counts(output: &str) -> Option<TestCounts> {
    if let Some(caps) = JEST_TESTS_LINE.captures(output) {
        let total: u32 = caps.get(3)?.as_str().parse().ok()?;
        let passed: u32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        return Some(TestCounts { passed, total });
    }

    if let Some(caps) = GENERIC_FRACTION.captures(output) {
        let passed: u32 = caps.get(1)?.as_str().parse().ok()?;
        let total: u32 = caps.get(2)?.as_str().parse().ok()?;
        return Some(TestCounts { passed, total });
    }

    if PYTEST_SUMMARY.is_match(output)
    && (PYTEST_PASSED_ONLY.is_match(output) || PYTEST_FAILED.is_match(output) || PYTEST_ERRORED.is_match(output))
    {
        let passed = first_u32(&PYTEST_PASSED_ONLY, output).unwrap_or(0);
        let failed = first_u32(&PYTEST_FAILED, output).unwrap_or(0);
        let errored = first_u32(&PYTEST_ERRORED, output).unwrap_or(0);
        let total = passed + failed + errored;
        if total > 0 {
            return Some(TestCounts { passed, total });
        }
    }

    let go_pass = GO_PASS_LINE.find_iter(output).count() as u32;
    let go_fail = GO_FAIL_LINE.find_iter(output).count() as u32;
    if go_pass + go_fail > 0 {
        return Some(TestCounts { passed: go_pass, total: go_pass + go_fail });
    }

    None
}

fn first_u32(pattern: &Regex, haystack: &str) -> Option<u32> {
    pattern.captures(haystack)?.get(1)?.as_str().parse().ok()
}

/// Count lint issues from raw lint stdout: an explicit `N problems`/`N
/// problem` summary wins if present; otherwise count `file:line:col:`
/// style locations.
pub fn lint_issue_count(output: &str) -> u32 {
    if let Some(caps) = LINT_PROBLEMS_SUMMARY.captures(output) {
        if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            return n;
        }
    }
    LINT_LOCATION.find_iter(output).count() as u32
}

#[cfg(test)]
#[path = "parsing_tests.rs"]
mod tests;
