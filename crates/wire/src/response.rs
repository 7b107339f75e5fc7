// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use tumbler_core::{Phase, Project};

/// Lightweight per-project listing row, matching
/// [`tumbler_storage::ProjectSummary`] without pulling the storage crate
/// into every wire client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectListEntry {
    pub name: String,
    pub phase: Phase,
    pub iteration: u32,
}

/// Response from the daemon to `tumbler-cli`, carried as length-prefixed
/// JSON over the control socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success with no further payload.
    Ok,

    /// Health check response.
    Pong,

    /// Version handshake response.
    Hello { version: String },

    /// Daemon is shutting down; no further requests will be accepted.
    ShuttingDown,

    /// `Start` was accepted.
    Started { project: String },

    /// `Stop` was accepted; the loop will reach idle shortly.
    Stopping { project: String },

    /// `Reset` completed synchronously.
    ResetDone { project: String },

    /// `Delete` completed synchronously.
    Deleted { project: String },

    /// `UpdateProviders` / `UpdateCompression` were applied.
    ConfigUpdated { project: String },

    /// Full project state (`GetProject`).
    Project { project: Option<Box<Project>> },

    /// Project listing (`ListProjects`).
    Projects { projects: Vec<ProjectListEntry> },

    /// Daemon-wide status (`DaemonStatus`).
    DaemonStatus {
        uptime_secs: u64,
        projects_running: usize,
        capacity: usize,
    },

    /// Acknowledges a `Subscribe` request; the connection now streams
    /// length-prefixed `Event` frames until the client disconnects.
    Subscribed,

    /// The orchestrator's running-project pool is full (the documented contract
    /// "additional start requests are rejected (not queued) with
    /// `AtCapacity`").
    AtCapacity,

    /// The named project does not exist.
    NotFound { project: String },

    /// Any other failure, with a human-readable message.
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
