// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-safety invariants for destructive filesystem operations.
//!
//! Every function here is written so that violating one of the five hard
//! invariants fails the operation rather than silently doing the wrong
//! thing: escaping the project root, crossing a mount point, following a
//! symlink during a walk, retrying after a permission error, or deleting
//! directories before the files inside them.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathSafetyError {
    #[error("path {path} resolves outside project root {root}")]
    Escape { path: PathBuf, root: PathBuf },
    #[error("refusing to operate on mount point: {0}")]
    MountPoint(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolve `candidate` (a path that should live under `root`) and confirm
/// it is a descendant of `root` after symlink expansion. `candidate` need
/// not exist yet; only the deepest existing ancestor is canonicalized, and
/// the remaining (not-yet-created) components are appended literally.
pub fn resolve_within(root: &Path, candidate: &Path) -> Result<PathBuf, PathSafetyError> {
    let root_canon = root.canonicalize()?;
    let resolved = canonicalize_best_effort(candidate)?;
    if resolved.starts_with(&root_canon) {
        Ok(resolved)
    } else {
        Err(PathSafetyError::Escape { path: resolved, root: root_canon })
    }
}

/// Canonicalize as much of `path` as exists, then append the remaining
/// (non-existent) tail components unresolved.
fn canonicalize_best_effort(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path;
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(canon) => {
                let mut result = canon;
                for component in tail.into_iter().rev() {
                    result.push(component);
                }
                return Ok(result);
            }
            Err(_) => match existing.parent() {
                Some(parent) => {
                    if let Some(name) = existing.file_name() {
                        tail.push(name);
                    }
                    existing = parent;
                }
                None => {
                    // Reached the filesystem root without finding an existing
                    // ancestor; nothing to canonicalize against.
                    let mut result = PathBuf::new();
                    for component in tail.into_iter().rev() {
                        result.push(component);
                    }
                    return Ok(result);
                }
            },
        }
    }
}

/// Returns true if `path` sits on a different filesystem device than its
/// parent — i.e. is itself a mount point. Directory removal refuses to
/// cross these (invariant 2).
#[cfg(unix)]
pub fn is_mount_point(path: &Path) -> std::io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let meta = std::fs::symlink_metadata(path)?;
    let parent = path.parent().unwrap_or(path);
    let parent_meta = std::fs::symlink_metadata(parent)?;
    Ok(meta.dev() != parent_meta.dev())
}

#[cfg(not(unix))]
pub fn is_mount_point(_path: &Path) -> std::io::Result<bool> {
    Ok(false)
}

/// Recursively delete `dir`, which must already be a resolved descendant of
/// `project_root`. Symlinks are unlinked directly, never followed.
/// Permission errors on individual entries are logged and skipped, never
/// retried. Deletion order is bottom-up: files (and symlinks) in a
/// directory are removed before the directory itself.
pub fn delete_tree(dir: &Path, project_root: &Path) -> Result<(), PathSafetyError> {
    if is_mount_point(dir)? {
        return Err(PathSafetyError::MountPoint(dir.to_path_buf()));
    }
    delete_tree_inner(dir, project_root);
    Ok(())
}

fn delete_tree_inner(dir: &Path, project_root: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.starts_with(project_root) {
            tracing::error!(path = %path.display(), root = %project_root.display(), "path escape detected during walk, skipping");
            continue;
        }

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping entry with unreadable file type");
                continue;
            }
        };

        if file_type.is_symlink() {
            // Never follow: remove the link itself.
            if let Err(e) = std::fs::remove_file(&path) {
                log_delete_error(&path, e);
            }
        } else if file_type.is_dir() {
            match is_mount_point(&path) {
                Ok(true) => {
                    tracing::error!(path = %path.display(), "refusing to descend into mount point");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping directory with unreadable metadata");
                    continue;
                }
            }
            delete_tree_inner(&path, project_root);
            if let Err(e) = std::fs::remove_dir(&path) {
                log_delete_error(&path, e);
            }
        } else {
            if let Err(e) = std::fs::remove_file(&path) {
                log_delete_error(&path, e);
            }
        }
    }
}

fn log_delete_error(path: &Path, e: std::io::Error) {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        tracing::warn!(path = %path.display(), "permission denied deleting entry, skipping (no retry)");
    } else {
        tracing::warn!(path = %path.display(), error = %e, "failed to delete entry, skipping");
    }
}

/// Walk `root` collecting file paths for archiving, skipping symlinks
/// entirely and never following them, honoring the same invariants as
/// `delete_tree`.
pub fn walk_archivable_files(root: &Path) -> Result<Vec<PathBuf>, PathSafetyError> {
    let mut out = Vec::new();
    walk_archivable_inner(root, root, &mut out);
    Ok(out)
}

fn walk_archivable_inner(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable directory during archive walk");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };
        if file_type.is_symlink() {
            tracing::warn!(path = %path.display(), "skipping symlink during archive walk");
            continue;
        }
        if file_type.is_dir() {
            walk_archivable_inner(&path, root, out);
            continue;
        }
        match resolve_within(root, &path) {
            Ok(_) => out.push(path),
            Err(_) => {
                tracing::warn!(path = %path.display(), "skipping file whose resolved path escapes root");
            }
        }
    }
}

#[cfg(test)]
#[path = "path_safety_tests.rs"]
mod tests;
