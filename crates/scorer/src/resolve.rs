// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Score resolution: the Verifier's
//! free-text report wins if it states an overall score; otherwise the
//! deterministic metric score is used; otherwise a fixed default.

use regex::Regex;
use std::sync::LazyLock;

/// Score used when neither an LLM-parsed score nor a metric score is
/// available — "signals needs human judgement".
pub const DEFAULT_SCORE: f64 = 5.0;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static OVERALL_SCORE: LazyLock<Regex> =
LazyLock::new(|| Regex::new(r"(?i)overall\s+score\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*10").expect("static pattern"));

/// Parse `Overall Score: X/10` out of a Verifier's free-text report.
pub fn parse_overall_score(report: &str) -> Option<f64> {
    let value: f64 = OVERALL_SCORE.captures(report)?.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 10.0))
}

/// Resolve the final score: a parsed free-text score wins, else the
/// deterministic metric score, else [`DEFAULT_SCORE`].
pub fn resolve_score(report: Option<&str>, metric: Option<f64>) -> f64 {
    report.and_then(parse_overall_score).or(metric).unwrap_or(DEFAULT_SCORE)
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
