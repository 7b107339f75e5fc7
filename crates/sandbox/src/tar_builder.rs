// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory tar construction for container ingress.
//!
//! The walk itself — symlink skip, path-containment check, no
//! symlink-following — is the same one the State Store uses to build
//! archives for `05_final/` (`tumbler_storage::walk_archivable_files`);
//! this module just feeds that walk's output into a `tar::Builder` instead
//! of a zip writer.

use std::path::Path;
use tumbler_storage::PathSafetyError;

#[derive(Debug, thiserror::Error)]
pub enum TarBuildError {
    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build an in-memory tar archive of `workspace`, relative paths only.
/// Symlinks are never archived; any file whose resolved path would escape
/// `workspace` is skipped with a logged warning (both enforced by the
/// shared walk).
pub fn build_tar(workspace: &Path) -> Result<Vec<u8>, TarBuildError> {
    let files = tumbler_storage::walk_archivable_files(workspace)?;
    let mut builder = tar::Builder::new(Vec::new());
    for path in files {
        let relative = match path.strip_prefix(workspace) {
            Ok(rel) => rel,
            Err(_) => {
                tracing::warn!(path = %path.display(), "skipping file outside workspace during tar build");
                continue;
            }
        };
        builder.append_path_with_name(&path, relative)?;
    }
    let bytes = builder.into_inner()?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "tar_builder_tests.rs"]
mod tests;
