// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;
use tokio::net::UnixStream;

use tumbler_agents::{PassthroughCompression, ProviderRegistry};
use tumbler_core::ResourceLimits;
use tumbler_engine::{AgentRoleConfig, LoopCollaborators, LoopConfig, ModelConfig};
use tumbler_eventbus::EventBus;
use tumbler_sandbox::{ContainerProxy, ProxyError, ProxyPhaseOutput};
use tumbler_storage::StateStore;
use tumbler_wire::{read_message, write_message, ProjectListEntry as WireProjectListEntry};

struct UnusedProxy;

#[async_trait]
impl ContainerProxy for UnusedProxy {
    async fn create_session(&self, _image: &str, _archive: Vec<u8>, _resources: ResourceLimits) -> Result<String, ProxyError> {
        panic!("sandbox should not run before an agent provider has been resolved")
    }
    async fn run_phase(
        &self,
        _session_id: &str,
        _phase: tumbler_core::SandboxPhase,
        _commands: &[String],
        _timeout: Duration,
    ) -> Result<ProxyPhaseOutput, ProxyError> {
        panic!("sandbox should not run before an agent provider has been resolved")
    }
    async fn teardown(&self, _session_id: &str) {}
}

fn test_orchestrator(root: std::path::PathBuf, max_concurrent_projects: usize) -> Orchestrator {
    let store = Arc::new(StateStore::new(root.clone()));
    let bus = EventBus::default();
    let role = AgentRoleConfig { provider_id: "none".to_string(), model: "test".to_string() };
    let collaborators = LoopCollaborators {
        store: store.clone(),
        bus: bus.clone(),
        providers: Arc::new(ProviderRegistry::new()),
        compression: Arc::new(PassthroughCompression),
        proxy: Arc::new(UnusedProxy),
        models: ModelConfig { architect: role.clone(), engineer: role.clone(), verifier: role },
        resources: ResourceLimits::default(),
        config: LoopConfig::default(),
    };
    Orchestrator::new(root, store, bus, collaborators, max_concurrent_projects)
}

async fn roundtrip(stream: &mut UnixStream, request: &Request) -> Response {
    let bytes = tumbler_wire::encode(request).expect("encode");
    write_message(stream, &bytes).await.expect("write");
    let response_bytes = read_message(stream).await.expect("read");
    tumbler_wire::decode(&response_bytes).expect("decode")
}

async fn start_test_server(max_concurrent_projects: usize) -> (std::path::PathBuf, tempfile::TempDir, CancellationToken, Orchestrator) {
    let dir = tempdir().expect("tempdir");
    let socket_path = dir.path().join("daemon.sock");
    let orchestrator = test_orchestrator(dir.path().join("workspace"), max_concurrent_projects);
    let shutdown = CancellationToken::new();

    let serve_socket = socket_path.clone();
    let serve_orchestrator = orchestrator.clone();
    let serve_shutdown = shutdown.clone();
    tokio::spawn(async move {
            let _ = serve(&serve_socket, serve_orchestrator, serve_shutdown).await;
    });
    // Give the listener a moment to bind before the test connects.
    tokio::time::sleep(Duration::from_millis(50)).await;
    (socket_path, dir, shutdown, orchestrator)
}

#[tokio::test]
async fn ping_returns_pong() {
    let (socket_path, _dir, shutdown, _orchestrator) = start_test_server(3).await;
    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    assert_eq!(roundtrip(&mut stream, &Request::Ping).await, Response::Pong);
    shutdown.cancel();
}

#[tokio::test]
async fn daemon_status_reports_capacity() {
    let (socket_path, _dir, shutdown, _orchestrator) = start_test_server(4).await;
    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    let response = roundtrip(&mut stream, &Request::DaemonStatus).await;
    match response {
        Response::DaemonStatus { capacity, projects_running, .. } => {
            assert_eq!(capacity, 4);
            assert_eq!(projects_running, 0);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    shutdown.cancel();
}

#[tokio::test]
async fn start_at_zero_capacity_is_rejected() {
    let (socket_path, _dir, shutdown, _orchestrator) = start_test_server(0).await;
    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    let response = roundtrip(&mut stream, &Request::Start { project: "acme".to_string(), requirements: Some("build it".to_string()) }).await;
    assert_eq!(response, Response::AtCapacity);
    shutdown.cancel();
}

#[tokio::test]
async fn get_unknown_project_returns_not_found_payload() {
    let (socket_path, _dir, shutdown, _orchestrator) = start_test_server(3).await;
    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    let response = roundtrip(&mut stream, &Request::GetProject { project: "ghost".to_string() }).await;
    match response {
        Response::Project { project: None } => {}
        other => panic!("unexpected response: {other:?}"),
    }
    shutdown.cancel();
}

#[tokio::test]
async fn list_projects_reflects_orchestrator_state() {
    let (socket_path, _dir, shutdown, orchestrator) = start_test_server(3).await;
    orchestrator.create_project("acme", "reqs", tumbler_core::ProjectConfig::default()).await.expect("create");

    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");
    let response = roundtrip(&mut stream, &Request::ListProjects).await;
    match response {
        Response::Projects { projects } => {
            assert_eq!(projects, vec![WireProjectListEntry { name: "acme".to_string(), phase: tumbler_core::Phase::Idle, iteration: 0 }]);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    shutdown.cancel();
}

#[tokio::test]
async fn subscribe_streams_published_events() {
    let (socket_path, _dir, shutdown, orchestrator) = start_test_server(3).await;
    let mut stream = UnixStream::connect(&socket_path).await.expect("connect");

    let bytes = tumbler_wire::encode(&Request::Subscribe { project: None, kinds: vec![] }).expect("encode");
    write_message(&mut stream, &bytes).await.expect("write");
    let ack_bytes = read_message(&mut stream).await.expect("read ack");
    let ack: Response = tumbler_wire::decode(&ack_bytes).expect("decode ack");
    assert_eq!(ack, Response::Subscribed);

    // Give the subscription a moment to register before publishing.
    tokio::time::sleep(Duration::from_millis(20)).await;
    orchestrator
    .bus()
    .publish(tumbler_core::Event::Log { project: Some("acme".to_string()), level: "info".to_string(), message: "hello".to_string() })
    .await;

    let event_bytes = tokio::time::timeout(Duration::from_secs(5), read_message(&mut stream)).await.expect("no timeout").expect("read event");
    let event: tumbler_core::Event = tumbler_wire::decode(&event_bytes).expect("decode event");
    assert_eq!(event.project(), Some("acme"));
    shutdown.cancel();
}
