// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures, exported to other crates behind `test-support`.

/// A short requirements document used across fixtures.
pub const SAMPLE_REQUIREMENTS: &str =
"Write a Python CLI that prints 'hello world'. Include pytest tests.";

/// Build a UTC timestamp from a millisecond epoch offset, for deterministic tests.
pub fn epoch_ms(ms: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(ms).unwrap_or_else(chrono::Utc::now)
}
