// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-role interpretation of an agent's raw reply text.

use std::path::Path;
use tumbler_core::{AgentRole, FileEntry, Runtime};

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// Architect reply: PLAN.md content, written verbatim.
    Plan(String),
    /// Engineer reply: a normalized file list ready for `03_staging/`.
    Files(Vec<FileEntry>),
    /// Verifier reply: the free-text REPORT_iter{N}.md body. Score
    /// extraction is the scorer crate's job, not this one's.
    Report(String),
}

/// Interpret `raw` per `role`'s expected shape. Architect and Verifier
/// replies are passed through untouched; Engineer replies are parsed as a
/// JSON array of `{path, content}` and normalized.
pub fn parse_output(role: AgentRole, raw: &str) -> AgentOutput {
    match role {
        AgentRole::Architect => AgentOutput::Plan(raw.to_string()),
        AgentRole::Verifier | AgentRole::System => AgentOutput::Report(raw.to_string()),
        AgentRole::Engineer => AgentOutput::Files(parse_engineer_files(raw)),
    }
}

fn parse_engineer_files(raw: &str) -> Vec<FileEntry> {
    let entries: Vec<FileEntry> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(%error, "engineer reply was not a valid file-entry array");
            return Vec::new();
        }
    };
    normalize_engineer_files(entries)
}

const RUNTIMES: &[Runtime] = &[Runtime::Node, Runtime::Python, Runtime::Go, Runtime::Rust, Runtime::Java];

/// Drop path-escape attempts, then strip a shared root directory so files
/// land at the staging root.
pub fn normalize_engineer_files(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let safe: Vec<FileEntry> = entries
    .into_iter()
    .filter(|entry| {
            let escapes = Path::new(&entry.path).components().any(|c| {
                matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir | std::path::Component::Prefix(_))
            });
            if escapes {
                tracing::warn!(path = %entry.path, "dropping engineer file entry that escapes the staging root");
            }
            !escapes
    })
    .collect();

    if safe.is_empty() {
        return safe;
    }

    let has_marker = safe.iter().any(|entry| {
            let name = Path::new(&entry.path).file_name().and_then(|n| n.to_str()).unwrap_or("");
            RUNTIMES.iter().any(|runtime| runtime.marker_files().contains(&name))
    });
    if has_marker {
        return safe;
    }

    match common_root(&safe) {
        Some(root) if !root.is_empty() => safe
        .into_iter()
        .map(|entry| FileEntry { path: strip_prefix(&entry.path, &root), content: entry.content })
        .collect(),
        _ => safe,
    }
}

fn common_root(entries: &[FileEntry]) -> Option<String> {
    let mut components = entries.iter().map(|e| {
            Path::new(&e.path).components().next().map(|c| c.as_os_str().to_string_lossy().into_owned())
    });
    let first = components.next().flatten()?;
    if components.all(|c| c.as_deref() == Some(first.as_str())) {
        Some(first)
    } else {
        None
    }
}

fn strip_prefix(path: &str, root: &str) -> String {
    Path::new(path)
    .strip_prefix(root)
    .map(|p| p.to_string_lossy().into_owned())
    .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
