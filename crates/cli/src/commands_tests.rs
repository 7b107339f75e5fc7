// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tempfile::{tempdir, TempDir};
use tokio::net::UnixListener;

/// Spawn a one-shot mock daemon that replies `response` to the first
/// request it reads, then exits the connection. Returns the owning
/// `TempDir` (keep it bound in the caller for the test's duration, or the
/// socket file is removed) alongside its socket path.
fn spawn_mock_daemon(response: Response) -> (TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("tempdir");
    let socket = dir.path().join("daemon.sock");
    let listener = std::os::unix::net::UnixListener::bind(&socket).expect("bind mock socket");
    listener.set_nonblocking(true).expect("nonblocking");
    let listener = UnixListener::from_std(listener).expect("tokio listener");
    let socket_clone = socket.clone();
    tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let _ = tumbler_wire::read_request(&mut stream).await;
            let _ = tumbler_wire::write_response(&mut stream, &response).await;
    });
    (dir, socket_clone)
}

async fn connect_mock(socket: &std::path::Path) -> DaemonClient {
    // The listener binds synchronously before the accept task is spawned,
    // so the very first connect attempt already succeeds; no retry loop
    // is needed, and none is used, to avoid stealing the one connection
    // the mock's single `accept()` call is waiting to serve.
    DaemonClient::connect(socket).await.expect("connect to mock daemon")
}

#[tokio::test]
#[serial]
async fn daemon_ping_prints_pong_on_pong_response() {
    let (_dir, socket) = spawn_mock_daemon(Response::Pong);
    let mut client = connect_mock(&socket).await;
    let response = client.call(Request::Ping).await.expect("call");
    assert!(matches!(response, Response::Pong));
}

#[tokio::test]
#[serial]
async fn project_show_not_found_maps_to_exit_code_three() {
    let (_dir, socket) = spawn_mock_daemon(Response::NotFound { project: "ghost".to_string() });
    let mut client = connect_mock(&socket).await;
    let response = client.call(Request::GetProject { project: "ghost".to_string() }).await.expect("call");
    let error = unexpected(&response);
    assert_eq!(error.code, 3);
}

#[test]
fn unexpected_maps_at_capacity_to_distinct_exit_code() {
    let error = unexpected(&Response::AtCapacity);
    assert_eq!(error.code, 4);
}

#[test]
fn unexpected_surfaces_daemon_error_message() {
    let error = unexpected(&Response::Error { message: "boom".to_string() });
    assert_eq!(error.code, 1);
    assert!(error.message.contains("boom"));
}

#[test]
fn read_requirements_reads_from_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("requirements.txt");
    std::fs::write(&path, "build a CLI").expect("write");
    let text = read_requirements(path.to_str().expect("utf8 path")).expect("read");
    assert_eq!(text, "build a CLI");
}

#[test]
fn read_requirements_reports_missing_file() {
    let error = read_requirements("/nonexistent/path/requirements.txt").unwrap_err();
    assert_eq!(error.code, 1);
}
