// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The State Store: the authoritative `.tumbler/` JSON files for every
//! project, plus the directory-clearing/deletion operations the Lifecycle
//! and Orchestrator Daemon drive through.

use crate::io_atomic::{atomic_write_json, read_json_or_default};
use crate::mirror::{NoopMirror, RdbmsMirror};
use crate::path_safety::{delete_tree, resolve_within, PathSafetyError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tumbler_core::{ConversationMessage, Project, UsageLog, UsageRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Lightweight summary returned by [`StateStore::list_projects`] without
/// loading each project's full conversation/usage history.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub workspace_root: PathBuf,
    pub phase: tumbler_core::Phase,
    pub iteration: u32,
}

const STATE_FILE: &str = "state.json";
const USAGE_FILE: &str = "usage.json";
const CONVERSATION_FILE: &str = "conversation.json";
const STATE_DIR: &str = ".tumbler";

/// Directories cleared (not deleted) by [`StateStore::reset_project`] — the
/// working artifacts of a run, as distinct from requirements and final
/// archives which survive a reset.
const RESETTABLE_DIRS: &[&str] = &["02_plan", "03_staging", "04_feedback"];

/// Owns every project's `.tumbler/` JSON files under a shared workspace
/// root. Writes are atomic (write-temp-then-rename) and best-effort
/// dual-written to an optional [`RdbmsMirror`]; reads always come from JSON.
pub struct StateStore {
    workspace_root: PathBuf,
    mirror: Arc<dyn RdbmsMirror>,
}

impl StateStore {
    /// A store with no RDBMS mirror configured.
    pub fn new(workspace_root: PathBuf) -> Self {
        Self::with_mirror(workspace_root, Arc::new(NoopMirror))
    }

    pub fn with_mirror(workspace_root: PathBuf, mirror: Arc<dyn RdbmsMirror>) -> Self {
        Self { workspace_root, mirror }
    }

    fn project_dir(&self, name: &str) -> PathBuf {
        self.workspace_root.join(name)
    }

    fn state_dir(&self, name: &str) -> PathBuf {
        self.project_dir(name).join(STATE_DIR)
    }

    /// Load `.tumbler/state.json`, or `None` if the project has never been saved.
    pub fn load_state(&self, name: &str) -> Result<Option<Project>, StoreError> {
        let path = self.state_dir(name).join(STATE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let project: Project = serde_json::from_slice(&bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Some(project))
    }

    /// Atomically persist `project`, then best-effort mirror it.
    pub fn save_state(&self, project: &Project) -> Result<(), StoreError> {
        let path = self.state_dir(&project.name).join(STATE_FILE);
        atomic_write_json(&path, project)?;
        self.mirror.mirror_state(&project.name, project);
        Ok(())
    }

    /// Load, append, and atomically rewrite the usage log, then mirror the
    /// updated totals.
    pub fn append_usage(&self, name: &str, record: UsageRecord) -> Result<UsageLog, StoreError> {
        let path = self.state_dir(name).join(USAGE_FILE);
        let mut log: UsageLog = read_json_or_default(&path)?;
        log.append(record);
        atomic_write_json(&path, &log)?;
        self.mirror.mirror_usage(name, &log);
        Ok(log)
    }

    /// Load, append, and atomically rewrite the conversation log. Conversation history is not dual-written to the
    /// RDBMS mirror — only state and usage are.
    pub fn append_conversation(&self, name: &str, message: ConversationMessage) -> Result<(), StoreError> {
        let path = self.state_dir(name).join(CONVERSATION_FILE);
        let mut history: Vec<ConversationMessage> = read_json_or_default(&path)?;
        history.push(message);
        atomic_write_json(&path, &history)
    }

    pub fn load_conversation(&self, name: &str) -> Result<Vec<ConversationMessage>, StoreError> {
        let path = self.state_dir(name).join(CONVERSATION_FILE);
        Ok(read_json_or_default(&path)?)
    }

    pub fn load_usage(&self, name: &str) -> Result<UsageLog, StoreError> {
        let path = self.state_dir(name).join(USAGE_FILE);
        Ok(read_json_or_default(&path)?)
    }

    /// Clear one of [`RESETTABLE_DIRS`] back to empty, refusing to touch
    /// anything outside the project root.
    fn safe_clear_dir(&self, project_root: &Path, relative: &str) -> Result<(), StoreError> {
        let target = project_root.join(relative);
        if !target.exists() {
            return Ok(());
        }
        let resolved = resolve_within(project_root, &target)?;
        delete_tree(&resolved, project_root)?;
        std::fs::create_dir_all(&resolved)?;
        Ok(())
    }

    /// Lifecycle Reset: clear the per-iteration working
    /// directories and truncate the usage/conversation logs, but leave
    /// `01_input/` and `05_final/` (and the `.tumbler/state.json`
    /// itself, which the caller rewrites separately via [`Project::reset`])
    /// untouched.
    pub fn reset_project(&self, name: &str) -> Result<(), StoreError> {
        let root = self.project_dir(name);
        for dir in RESETTABLE_DIRS {
            self.safe_clear_dir(&root, dir)?;
        }
        atomic_write_json(&self.state_dir(name).join(USAGE_FILE), &UsageLog::default())?;
        atomic_write_json(&self.state_dir(name).join(CONVERSATION_FILE), &Vec::<ConversationMessage>::new())?;
        Ok(())
    }

    /// Lifecycle Delete: remove the project's entire directory,
    /// including `.tumbler/`. Irreversible; the daemon is expected to have
    /// already stopped any running phase before calling this.
    pub fn delete_project(&self, name: &str) -> Result<(), StoreError> {
        let root = self.project_dir(name);
        if !root.exists() {
            return Ok(());
        }
        let resolved = resolve_within(&self.workspace_root, &root)?;
        delete_tree(&resolved, &resolved)?;
        std::fs::remove_dir(&resolved).or_else(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Ok(())
                } else {
                    Err(e)
                }
        })?;
        Ok(())
    }

    /// Scan the workspace root for projects with a `.tumbler/state.json`,
    /// used by the daemon's startup reconciliation.
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>, StoreError> {
        let mut out = Vec::new();
        let entries = match std::fs::read_dir(&self.workspace_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if let Some(project) = self.load_state(&name)? {
                out.push(ProjectSummary {
                        name: project.name,
                        workspace_root: project.workspace_root,
                        phase: project.phase,
                        iteration: project.iteration,
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
