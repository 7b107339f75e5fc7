// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over the control socket. Grounded on the teacher's `DaemonClient` shape — connect once,
//! then one request/response round trip per call — generalized to the
//! `tumbler-wire` `Request`/`Response` enums instead of the teacher's JSON
//! job-queue protocol.

use std::path::{Path, PathBuf};

use tokio::net::UnixStream;

use tumbler_wire::{read_message, write_message, Request, Response};

use crate::exit_error::ExitError;

pub struct DaemonClient {
    stream: UnixStream,
    socket_path: PathBuf,
}

impl DaemonClient {
    pub async fn connect(socket_path: &Path) -> Result<Self, ExitError> {
        let stream = UnixStream::connect(socket_path).await.map_err(|_| ExitError::not_running(socket_path))?;
        Ok(Self { stream, socket_path: socket_path.to_path_buf() })
    }

    /// Send one request and read back exactly one response. Not valid to
    /// call again after a `Subscribe` request — use [`Self::next_event`]
    /// for the remainder of that connection's lifetime.
    pub async fn call(&mut self, request: Request) -> Result<Response, ExitError> {
        let bytes = tumbler_wire::encode(&request)?;
        write_message(&mut self.stream, &bytes).await?;
        let response_bytes = read_message(&mut self.stream).await?;
        Ok(tumbler_wire::decode(&response_bytes)?)
    }

    /// Read one more streamed event frame after a `Subscribe` call's
    /// `Subscribed` acknowledgement. Returns `None` once the daemon closes
    /// the connection.
    pub async fn next_event(&mut self) -> Result<Option<tumbler_core::Event>, ExitError> {
        match read_message(&mut self.stream).await {
            Ok(bytes) => Ok(Some(tumbler_wire::decode(&bytes)?)),
            Err(tumbler_wire::ProtocolError::Io(io_error)) if io_error.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}
