// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archives `03_staging/` to `05_final/{name}_{YYYYMMDD_HHMMSS}.zip` on
//! convergence.

use crate::path_safety::{walk_archivable_files, PathSafetyError};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Zip `staging_dir` into `05_final/{name}_{timestamp}.zip`, honoring the
/// same symlink-skip and path-containment rules as the sandbox's tar
/// builder.
pub fn archive_staging(
    staging_dir: &Path,
    final_dir: &Path,
    name: &str,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Result<PathBuf, ArchiveError> {
    std::fs::create_dir_all(final_dir)?;
    let file_name = format!("{name}_{}.zip", timestamp.format("%Y%m%d_%H%M%S"));
    let zip_path = final_dir.join(file_name);

    let files = walk_archivable_files(staging_dir)?;
    let file = std::fs::File::create(&zip_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
    .compression_method(zip::CompressionMethod::Deflated);

    for path in files {
        let relative = path.strip_prefix(staging_dir).unwrap_or(&path);
        let entry_name = relative.to_string_lossy().replace('\\', "/");
        writer.start_file(entry_name, options)?;
        let contents = std::fs::read(&path)?;
        writer.write_all(&contents)?;
    }
    writer.finish()?;
    Ok(zip_path)
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
