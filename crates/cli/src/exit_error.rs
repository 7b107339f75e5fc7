// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code, so `main` turns failures
//! into the right exit status instead of every command calling
//! `std::process::exit` itself.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The daemon is not reachable at the configured socket path.
    pub fn not_running(socket_path: &std::path::Path) -> Self {
        Self::new(2, format!("tumblerd is not running (no socket at {})", socket_path.display()))
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<tumbler_wire::ProtocolError> for ExitError {
    fn from(error: tumbler_wire::ProtocolError) -> Self {
        Self::new(1, format!("protocol error: {error}"))
    }
}
