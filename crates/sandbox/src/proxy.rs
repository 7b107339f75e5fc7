// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The restricted container proxy client.
//!
//! The Executor never talks to the container daemon directly; it talks to
//! a sidecar proxy that exposes only container-and-image operations (no
//! exec, no volumes, no privileged ops). The real HTTP implementation
//! below follows the provider-client shape used elsewhere in this
//! workspace for outbound JSON APIs: a `reqwest::Client` plus a base URL,
//! one method per remote operation, errors mapped into a local enum.

use std::time::Duration;
use tumbler_core::{ResourceLimits, SandboxPhase};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("container proxy unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("container proxy returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("phase exceeded its timeout")]
    Timeout,
}

/// Raw output of one phase run inside the active session's container.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ProxyPhaseOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// The three operations the restricted proxy exposes: start an isolated
/// session from an image and an in-memory tar of the workspace, run one
/// phase's commands inside it, tear it down. Implementations must not
/// expose exec/volume/privileged access beyond this surface.
#[async_trait::async_trait]
pub trait ContainerProxy: Send + Sync {
    async fn create_session(
        &self,
        image: &str,
        archive: Vec<u8>,
        resources: ResourceLimits,
    ) -> Result<String, ProxyError>;

    async fn run_phase(
        &self,
        session_id: &str,
        phase: SandboxPhase,
        commands: &[String],
        timeout: Duration,
    ) -> Result<ProxyPhaseOutput, ProxyError>;

    /// Best-effort teardown; callers must not treat failure here as fatal
    ///.
    async fn teardown(&self, session_id: &str);
}

#[derive(serde::Serialize)]
struct CreateSessionRequest<'a> {
    image: &'a str,
    resources: ResourceLimits,
}

#[derive(serde::Deserialize)]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(serde::Serialize)]
struct RunPhaseRequest<'a> {
    phase: SandboxPhase,
    commands: &'a [String],
    timeout_secs: u64,
}

/// HTTP client for the restricted proxy's REST surface. Built with
/// `rustls-tls` so the proxy need not be reached over plaintext; the
/// default client timeout is a hard backstop above the longest phase
/// timeout (install/build, 300s) to guarantee `run_phase` itself never
/// hangs past our own accounting.
pub struct HttpContainerProxy {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContainerProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
            .timeout(Duration::from_secs(330))
            .build()
            .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ContainerProxy for HttpContainerProxy {
    async fn create_session(
        &self,
        image: &str,
        archive: Vec<u8>,
        resources: ResourceLimits,
    ) -> Result<String, ProxyError> {
        let manifest = serde_json::to_string(&CreateSessionRequest { image, resources })
        .unwrap_or_else(|_| "{}".to_string());
        let form = reqwest::multipart::Form::new()
        .text("manifest", manifest)
        .part("workspace", reqwest::multipart::Part::bytes(archive).file_name("workspace.tar"));

        let response =
        self.client.post(format!("{}/v1/sessions", self.base_url)).multipart(form).send().await?;
        let response = error_for_status(response).await?;
        let body: CreateSessionResponse = response.json().await?;
        Ok(body.session_id)
    }

    async fn run_phase(
        &self,
        session_id: &str,
        phase: SandboxPhase,
        commands: &[String],
        timeout: Duration,
    ) -> Result<ProxyPhaseOutput, ProxyError> {
        let request = RunPhaseRequest { phase, commands, timeout_secs: timeout.as_secs() };
        let response = self
        .client
        .post(format!("{}/v1/sessions/{session_id}/run", self.base_url))
        .json(&request)
        .send()
        .await?;
        let response = error_for_status(response).await?;
        let body: ProxyPhaseOutput = response.json().await?;
        Ok(body)
    }

    async fn teardown(&self, session_id: &str) {
        if let Err(error) =
        self.client.delete(format!("{}/v1/sessions/{session_id}", self.base_url)).send().await
        {
            tracing::warn!(session_id, %error, "container proxy teardown request failed");
        }
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ProxyError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ProxyError::Status { status, body })
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
