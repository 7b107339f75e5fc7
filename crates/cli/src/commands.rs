// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommand implementations: each handler opens one connection, sends
//! one (or, for `events`, a stream of) request(s), and prints the result.

use clap::Subcommand;

use tumbler_wire::{Request, Response};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::{socket_path, CliResult};

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Ping the daemon (exits non-zero if unreachable).
    Ping,
    /// Print uptime, running-project count, and pool capacity.
    Status,
    /// Ask the daemon to shut down.
    Shutdown {
        /// Skip the drain interval and tear down containers immediately.
        #[arg(long)]
        kill: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project from a requirements file without starting it.
    Create {
        name: String,
        /// Path to a requirements text file; `-` reads stdin.
        #[arg(long)]
        requirements: String,
    },
    /// Start (or create-and-start) a project's feedback loop.
    Start {
        name: String,
        /// Optional requirements text, used only if the project does not exist yet.
        #[arg(long)]
        requirements: Option<String>,
    },
    /// Signal Stop; the loop settles into `idle` after in-flight work unwinds.
    Stop { name: String },
    /// Clear working directories and return the project to idle/iteration 0.
    Reset { name: String },
    /// Remove the project's entire directory.
    Delete { name: String },
    /// List every project the workspace root knows about.
    List,
    /// Print one project's full persisted state as JSON.
    Show { name: String },
}

pub async fn daemon(command: DaemonCommand) -> CliResult<()> {
    let socket = socket_path();
    let mut client = DaemonClient::connect(&socket).await?;
    match command {
        DaemonCommand::Ping => match client.call(Request::Ping).await? {
            Response::Pong => {
                println!("pong");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        DaemonCommand::Status => match client.call(Request::DaemonStatus).await? {
            Response::DaemonStatus { uptime_secs, projects_running, capacity } => {
                println!("uptime: {uptime_secs}s");
                println!("projects running: {projects_running}/{capacity}");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        DaemonCommand::Shutdown { kill } => match client.call(Request::Shutdown { kill }).await? {
            Response::ShuttingDown => {
                println!("tumblerd is shutting down");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
    }
}

pub async fn project(command: ProjectCommand) -> CliResult<()> {
    let socket = socket_path();
    let mut client = DaemonClient::connect(&socket).await?;
    match command {
        ProjectCommand::Create { name, requirements } => {
            let text = read_requirements(&requirements)?;
            match client.call(Request::Start { project: name.clone(), requirements: Some(text) }).await? {
                Response::Started { project } => {
                    client.call(Request::Stop { project: project.clone() }).await?;
                    println!("created {project}");
                    Ok(())
                }
                other => Err(unexpected(&other)),
            }
        }
        ProjectCommand::Start { name, requirements } => {
            match client.call(Request::Start { project: name, requirements }).await? {
                Response::Started { project } => {
                    println!("started {project}");
                    Ok(())
                }
                other => Err(unexpected(&other)),
            }
        }
        ProjectCommand::Stop { name } => match client.call(Request::Stop { project: name }).await? {
            Response::Stopping { project } => {
                println!("stopping {project}");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        ProjectCommand::Reset { name } => match client.call(Request::Reset { project: name }).await? {
            Response::ResetDone { project } => {
                println!("reset {project}");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        ProjectCommand::Delete { name } => match client.call(Request::Delete { project: name }).await? {
            Response::Deleted { project } => {
                println!("deleted {project}");
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        ProjectCommand::List => match client.call(Request::ListProjects).await? {
            Response::Projects { projects } => {
                if projects.is_empty() {
                    println!("no projects");
                } else {
                    for entry in projects {
                        println!("{:<24} {:<12} iter {}", entry.name, entry.phase, entry.iteration);
                    }
                }
                Ok(())
            }
            other => Err(unexpected(&other)),
        },
        ProjectCommand::Show { name } => match client.call(Request::GetProject { project: name }).await? {
            Response::Project { project: Some(project) } => {
                let json = serde_json::to_string_pretty(&project).map_err(|error| ExitError::new(1, error.to_string()))?;
                println!("{json}");
                Ok(())
            }
            Response::Project { project: None } | Response::NotFound { .. } => Err(ExitError::new(3, "project not found")),
            other => Err(unexpected(&other)),
        },
    }
}

pub async fn events(project: Option<String>, kinds: Vec<String>) -> CliResult<()> {
    let socket = socket_path();
    let mut client = DaemonClient::connect(&socket).await?;
    match client.call(Request::Subscribe { project, kinds }).await? {
        Response::Subscribed => {}
        other => return Err(unexpected(&other)),
    }
    while let Some(event) = client.next_event().await? {
        let json = serde_json::to_string(&event).map_err(|error| ExitError::new(1, error.to_string()))?;
        println!("{json}");
    }
    Ok(())
}

fn read_requirements(source: &str) -> CliResult<String> {
    if source == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).map_err(|error| ExitError::new(1, format!("reading stdin: {error}")))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(source).map_err(|error| ExitError::new(1, format!("reading {source}: {error}")))
    }
}

fn unexpected(response: &Response) -> ExitError {
    match response {
        Response::Error { message } => ExitError::new(1, message.clone()),
        Response::AtCapacity => ExitError::new(4, "the running-project pool is full"),
        Response::NotFound { project } => ExitError::new(3, format!("project {project:?} not found")),
        other => ExitError::new(1, format!("unexpected daemon response: {other:?}")),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
