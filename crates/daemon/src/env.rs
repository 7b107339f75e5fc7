// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment-variable access for the daemon crate.

use std::path::PathBuf;

/// Resolve the daemon's state directory: `TUMBLER_STATE_DIR` >
/// `XDG_STATE_HOME/tumbler` > `~/.local/state/tumbler`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TUMBLER_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("tumbler");
    }
    dirs::state_dir().unwrap_or_else(|| PathBuf::from(".")).join("tumbler")
}

/// Path to the YAML config file: `TUMBLER_CONFIG` or `<state_dir>/config.yaml`.
pub fn config_path() -> PathBuf {
    std::env::var("TUMBLER_CONFIG").map(PathBuf::from).unwrap_or_else(|_| state_dir().join("config.yaml"))
}

/// Path to the control socket: `TUMBLER_SOCKET` or `<state_dir>/daemon.sock`.
pub fn socket_path() -> PathBuf {
    std::env::var("TUMBLER_SOCKET").map(PathBuf::from).unwrap_or_else(|_| state_dir().join("daemon.sock"))
}
