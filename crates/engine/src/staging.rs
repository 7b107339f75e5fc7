// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads and writes `03_staging/` — the Engineer's code tree plus the
//! `.manifest.json` that signals completion to the watcher and API (spec
//! §3 Workspace Layout, §6 "Engineer output format").

use std::path::{Path, PathBuf};
use tumbler_core::FileEntry;
use tumbler_storage::{resolve_within, PathSafetyError};

pub const MANIFEST_FILE: &str = ".manifest.json";

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Manifest {
    files: Vec<String>,
    completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Write every entry in `files` under `staging_dir`, then the `.manifest.json`
/// that records completion. Entries have already been filtered
/// for path escapes by `tumbler_agents::output::normalize_engineer_files`;
/// `resolve_within` is a second, independent guard at the point of writing.
pub fn write_staging(staging_dir: &Path, files: &[FileEntry], now: chrono::DateTime<chrono::Utc>) -> Result<(), StagingError> {
    std::fs::create_dir_all(staging_dir)?;
    for entry in files {
        let target = staging_dir.join(&entry.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let resolved = resolve_within(staging_dir, &target)?;
        std::fs::write(&resolved, &entry.content)?;
    }

    let manifest = Manifest { files: files.iter().map(|f| f.path.clone()).collect(), completed_at: now };
    let manifest_path = staging_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)?;
    Ok(())
}

/// True once the Engineer has finished writing this iteration's files
///.
pub fn manifest_exists(staging_dir: &Path) -> bool {
    staging_dir.join(MANIFEST_FILE).is_file()
}

/// Read every file under `staging_dir` (excluding the manifest itself) back
/// into a listing with contents, used both for the Verifier's code listing
/// and the Engineer's "previous staging" context at iteration ≥ 2.
pub fn read_staging_listing(staging_dir: &Path) -> Result<Vec<FileEntry>, StagingError> {
    let mut out = Vec::new();
    if !staging_dir.exists() {
        return Ok(out);
    }
    let mut stack = vec![staging_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                stack.push(path);
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE) {
                continue;
            }
            let relative = relative_slash_path(staging_dir, &path);
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            out.push(FileEntry { path: relative, content });
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
