// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tumbler`: a thin CLI over the daemon's control socket. Out of scope per the documented contract ("the HTTP/REST façade
//! and web UI"), this is the one first-party consumer of that same control
//! surface, following the teacher's `oj` CLI layout: one subcommand group
//! per area of the daemon, each translating straight into a `Request`.

mod client;
mod commands;
mod exit_error;

use clap::{Parser, Subcommand};

use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "tumbler", version, about = "Control surface for tumblerd, the Code Tumbler orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daemon lifecycle: status and shutdown.
    #[command(subcommand)]
    Daemon(commands::DaemonCommand),
    /// Project lifecycle: create, start, stop, reset, delete, list, show.
    #[command(subcommand)]
    Project(commands::ProjectCommand),
    /// Stream Event Bus events for one or all projects.
    Events {
        /// Restrict the stream to one project.
        #[arg(long)]
        project: Option<String>,
        /// Restrict the stream to these event kinds (e.g. `phase_change score_update`).
        #[arg(long = "kind")]
        kinds: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Daemon(command) => commands::daemon(command).await,
        Commands::Project(command) => commands::project(command).await,
        Commands::Events { project, kinds } => commands::events(project, kinds).await,
    };

    if let Err(error) = result {
        eprintln!("tumbler: {error}");
        std::process::exit(error.code);
    }
}

/// Resolve the control socket path the same way `tumblerd` does
/// (`TUMBLER_SOCKET` > `<state_dir>/daemon.sock`), without depending on the
/// daemon crate's runtime machinery — only its `env` helpers.
pub(crate) fn socket_path() -> std::path::PathBuf {
    tumbler_daemon::env::socket_path()
}

pub(crate) type CliResult<T> = Result<T, ExitError>;
