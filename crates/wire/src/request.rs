// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tumbler_core::{AgentRole, CompressionConfig};

/// Request from `tumbler-cli` to the daemon, carried as length-prefixed
/// JSON over the control socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,

    /// Version handshake.
    Hello { version: String },

    /// Start a project's feedback loop: idle → planning.
    /// `requirements` is written to `01_input/requirements.txt` if the file
    /// does not already exist; if it does, the on-disk copy wins.
    Start {
        project: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requirements: Option<String>,
    },

    /// Signal the current in-flight operation and transition to idle after
    /// cleanup.
    Stop { project: String },

    /// Clear working directories and return the project to idle/iteration 0
    ///.
    Reset { project: String },

    /// Remove the project's entire directory.
    Delete { project: String },

    /// Replace a project's `provider_overrides` map.
    UpdateProviders { project: String, provider_overrides: HashMap<AgentRole, String> },

    /// Replace a project's `compression_config`.
    UpdateCompression { project: String, compression_config: CompressionConfig },

    /// Fetch one project's full persisted state.
    GetProject { project: String },

    /// List every project the workspace root knows about.
    ListProjects,

    /// Daemon-wide status: uptime, active project count, pool capacity.
    DaemonStatus,

    /// Open a streaming subscription to the Event Bus. After the response,
    /// the connection switches to a sequence of length-prefixed `Event`
    /// frames until the client disconnects.
    Subscribe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        kinds: Vec<String>,
    },

    /// Request daemon shutdown.
    Shutdown {
        /// Skip the bounded drain interval and tear down containers immediately.
        #[serde(default)]
        kill: bool,
    },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
