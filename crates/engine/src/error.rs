// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Internal error plumbing for one project loop run. Nothing here crosses
//! the loop's own boundary: a `LoopError` either retries (agent errors,
//! the documented contract) or is converted into a terminal [`tumbler_core::FailureReason`]
//! and persisted on the project.

use crate::staging::StagingError;
use tumbler_agents::AgentRunError;
use tumbler_storage::{ArchiveError, PathSafetyError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    PathSafety(#[from] PathSafetyError),
    #[error(transparent)]
    Agent(#[from] AgentRunError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("project {0:?} has no persisted state")]
    MissingProject(String),
}
