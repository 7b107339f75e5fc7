// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[derive(Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct Sample {
    value: u32,
}

#[test]
fn atomic_write_then_read_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    atomic_write_json(&path, &Sample { value: 42 }).expect("write");
    let back: Sample = read_json_or_default(&path).expect("read");
    assert_eq!(back, Sample { value: 42 });
}

#[test]
fn read_missing_file_returns_default() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing.json");
    let back: Sample = read_json_or_default(&path).expect("read");
    assert_eq!(back, Sample::default());
}

#[test]
fn no_tmp_file_left_behind_after_write() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    atomic_write_json(&path, &Sample { value: 1 }).expect("write");
    let entries: Vec<_> = std::fs::read_dir(dir.path())
    .expect("read_dir")
    .filter_map(|e| e.ok())
    .map(|e| e.file_name().to_string_lossy().into_owned())
    .collect();
    assert_eq!(entries, vec!["state.json".to_string()]);
}
