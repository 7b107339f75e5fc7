// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control socket: one task accepting connections,
//! one task per connection translating [`tumbler_wire::Request`] into
//! [`Orchestrator`] calls and framing back [`tumbler_wire::Response`].
//!
//! Grounded on the teacher's lock-file-plus-`UnixListener` startup shape;
//! the accept loop itself follows the ordinary per-connection-task pattern
//! used throughout the corpus for request/response services.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use tumbler_eventbus::Filter;
use tumbler_wire::{read_request, write_message, write_response, ProtocolError, Request, Response};

use crate::orchestrator::{Orchestrator, OrchestratorError};

impl From<OrchestratorError> for Response {
    fn from(error: OrchestratorError) -> Self {
        match error {
            OrchestratorError::AtCapacity => Response::AtCapacity,
            OrchestratorError::NotFound(project) => Response::NotFound { project },
            other => Response::Error { message: other.to_string() },
        }
    }
}

/// Bind `socket_path` and serve connections until `shutdown` is cancelled.
/// Removes a stale socket file left behind by an unclean prior exit before
/// binding (the lock file, acquired by the caller before this runs, is what
/// actually prevents two daemons racing for the same socket).
pub async fn serve(socket_path: &Path, orchestrator: Orchestrator, shutdown: CancellationToken) -> std::io::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    tracing::info!(socket = %socket_path.display(), "control socket listening");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("control socket shutting down");
                break;
            }
            accepted = listener.accept() => {
                let (stream, _addr) = accepted?;
                let orchestrator = orchestrator.clone();
                let conn_shutdown = shutdown.clone();
                tokio::spawn(async move {
                        if let Err(error) = handle_connection(stream, orchestrator, conn_shutdown).await {
                            tracing::debug!(%error, "control connection ended with an error");
                        }
                });
            }
        }
    }
    let _ = std::fs::remove_file(socket_path);
    Ok(())
}

async fn handle_connection(mut stream: UnixStream, orchestrator: Orchestrator, shutdown: CancellationToken) -> Result<(), ProtocolError> {
    loop {
        let request = match read_request(&mut stream).await {
            Ok(request) => request,
            Err(ProtocolError::Io(io_error)) if io_error.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(error) => return Err(error),
        };

        if let Request::Subscribe { project, kinds } = request {
            return stream_events(&mut stream, &orchestrator, project, kinds).await;
        }

        let response = dispatch(&request, &orchestrator, &shutdown).await;
        let shutting_down = matches!(response, Response::ShuttingDown);
        write_response(&mut stream, &response).await?;
        if shutting_down {
            return Ok(());
        }
    }
}

async fn dispatch(request: &Request, orchestrator: &Orchestrator, shutdown: &CancellationToken) -> Response {
    match request.clone() {
        Request::Ping => Response::Pong,
        Request::Hello { .. } => Response::Hello { version: env!("CARGO_PKG_VERSION").to_string() },
        Request::Start { project, requirements } => match orchestrator.start(&project, requirements.as_deref()).await {
            Ok(()) => Response::Started { project },
            Err(error) => error.into(),
        },
        Request::Stop { project } => match orchestrator.stop(&project).await {
            Ok(()) => Response::Stopping { project },
            Err(error) => error.into(),
        },
        Request::Reset { project } => match orchestrator.reset(&project).await {
            Ok(()) => Response::ResetDone { project },
            Err(error) => error.into(),
        },
        Request::Delete { project } => match orchestrator.delete(&project).await {
            Ok(()) => Response::Deleted { project },
            Err(error) => error.into(),
        },
        Request::UpdateProviders { project, provider_overrides } => {
            match orchestrator.update_providers(&project, provider_overrides).await {
                Ok(()) => Response::ConfigUpdated { project },
                Err(error) => error.into(),
            }
        }
        Request::UpdateCompression { project, compression_config } => {
            match orchestrator.update_compression(&project, compression_config).await {
                Ok(()) => Response::ConfigUpdated { project },
                Err(error) => error.into(),
            }
        }
        Request::GetProject { project } => match orchestrator.get_project(&project) {
            Ok(found) => Response::Project { project: found.map(Box::new) },
            Err(error) => error.into(),
        },
        Request::ListProjects => match orchestrator.list_projects() {
            Ok(projects) => Response::Projects { projects },
            Err(error) => error.into(),
        },
        Request::DaemonStatus => Response::DaemonStatus {
            uptime_secs: orchestrator.uptime().as_secs(),
            projects_running: orchestrator.projects_running().await,
            capacity: orchestrator.capacity(),
        },
        Request::Shutdown { kill } => {
            shutdown.cancel();
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                    orchestrator.shutdown(std::time::Duration::from_secs(10), kill).await;
            });
            Response::ShuttingDown
        }
        Request::Subscribe { .. } => unreachable!("Subscribe is handled by handle_connection before dispatch"),
    }
}

/// Once a client asks to `Subscribe`, the connection is no longer a
/// request/response cycle: it acknowledges once, then streams
/// length-prefixed [`tumbler_core::Event`] frames until the peer
/// disconnects.
async fn stream_events<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    orchestrator: &Orchestrator,
    project: Option<String>,
    kinds: Vec<String>,
) -> Result<(), ProtocolError> {
    write_response(stream, &Response::Subscribed).await?;

    // `Filter::kinds` matches against the event's `&'static str` kind
    // constants; a client's request carries owned `String`s instead, so the
    // project dimension is pushed into the bus's `Filter` and the kind
    // dimension is checked here against `event.kind()` by value.
    let filter = match project {
        Some(project) => Filter::for_project(project),
        None => Filter::all(),
    };
    let mut subscription = orchestrator.bus().subscribe(filter).await;
    while let Some(event) = subscription.recv().await {
        if !kinds.is_empty() && !kinds.iter().any(|kind| kind.as_str() == event.kind()) {
            continue;
        }
        let bytes = tumbler_wire::encode(&event)?;
        write_message(stream, &bytes).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
