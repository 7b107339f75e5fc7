// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase orchestration.

use crate::proxy::{ContainerProxy, ProxyError, ProxyPhaseOutput};
use crate::tar_builder::build_tar;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tumbler_core::{PhaseResult, PhaseStatus, ResourceLimits, Runtime, SandboxPhase, SandboxResult, SandboxStrategy};

/// Tears the session down when dropped, regardless of how `run` exits
///.
/// Teardown itself is fire-and-forget: `Drop` cannot be async, so the
/// request is spawned onto the runtime rather than awaited.
struct SessionGuard {
    proxy: Arc<dyn ContainerProxy>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let proxy = self.proxy.clone();
        let session_id = self.session_id.clone();
        tokio::spawn(async move {
                proxy.teardown(&session_id).await;
        });
    }
}

/// Run install/build/test/lint for `workspace` against `proxy`.
///
/// Infallible: a proxy that cannot be reached, or a workspace that cannot
/// be archived at all, produces [`SandboxResult::unavailable`] rather than
/// an error — the Feedback Loop falls back to code-review-only mode
/// instead of aborting.
pub async fn run(
    workspace: &Path,
    strategy: &SandboxStrategy,
    runtime: Runtime,
    resources: ResourceLimits,
    proxy: Arc<dyn ContainerProxy>,
) -> SandboxResult {
    let archive = match build_tar(workspace) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, workspace = %workspace.display(), "failed to build workspace archive, sandbox unavailable");
            return SandboxResult::unavailable();
        }
    };

    let session_id = match proxy.create_session(runtime.default_image(), archive, resources).await {
        Ok(id) => id,
        Err(error) => {
            tracing::warn!(%error, "container proxy unreachable, falling back to code-review-only mode");
            return SandboxResult::unavailable();
        }
    };
    let _guard = SessionGuard { proxy: proxy.clone(), session_id: session_id.clone() };

    let install = run_phase(&*proxy, &session_id, strategy, runtime, SandboxPhase::Install).await;

    let build = if install.exit_ok() {
        run_phase(&*proxy, &session_id, strategy, runtime, SandboxPhase::Build).await
    } else {
        PhaseResult::skipped()
    };

    let can_test = build.exit_ok();
    let (test, lint) = tokio::join!(
        async {
            if can_test {
                run_phase(&*proxy, &session_id, strategy, runtime, SandboxPhase::Test).await
            } else {
                PhaseResult::skipped()
            }
        },
        run_phase(&*proxy, &session_id, strategy, runtime, SandboxPhase::Lint),
    );

    SandboxResult { install, build, test, lint, available: true }
}

async fn run_phase(
    proxy: &dyn ContainerProxy,
    session_id: &str,
    strategy: &SandboxStrategy,
    runtime: Runtime,
    phase: SandboxPhase,
) -> PhaseResult {
    let commands = strategy.commands_for(phase, runtime);
    let timeout = phase.default_timeout();
    let started = std::time::Instant::now();

    match tokio::time::timeout(timeout, proxy.run_phase(session_id, phase, &commands, timeout)).await {
        Ok(Ok(ProxyPhaseOutput { stdout, stderr, exit_code })) => PhaseResult {
            status: Some(if exit_code == 0 { PhaseStatus::Passed } else { PhaseStatus::Failed }),
            stdout,
            stderr,
            exit_code: Some(exit_code),
            duration_ms: elapsed_ms(started),
            commands,
        },
        Ok(Err(error)) => {
            tracing::warn!(%error, phase = %phase, "sandbox phase request failed");
            PhaseResult {
                status: Some(PhaseStatus::Failed),
                stderr: proxy_error_message(error),
                duration_ms: elapsed_ms(started),
                commands,
                ..Default::default()
            }
        }
        Err(_elapsed) => PhaseResult {
            status: Some(PhaseStatus::Timeout),
            stderr: format!("phase {phase} exceeded its {}s timeout", timeout.as_secs()),
            duration_ms: elapsed_ms(started),
            commands,
            ..Default::default()
        },
    }
}

fn elapsed_ms(started: std::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn proxy_error_message(error: ProxyError) -> String {
    error.to_string()
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
