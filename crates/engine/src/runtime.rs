// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The async task that drives one project through the Feedback Loop state
//! machine end to end: Architect once, then Engineer→Verifying
//! iterations until convergence, an iteration cap, a cost cap, a wall-clock
//! timeout, or a Stop request.
//!
//! The state diagram has no path back from `verifying` to
//! `planning` — only the prose's "Iter ≥ 1 (revision)" context line
//! suggests otherwise. The diagram governs: the Architect runs exactly
//! once per project, before the Engineer/Verifier iteration loop begins.
//! `crate::context::architect_context` keeps its revision parameters for
//! API symmetry with the other two roles and is exercised directly by its
//! own unit tests, but `run_project` always calls it with `None`/`None`.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tumbler_agents::{AgentOutput, AgentRunError, ChatProvider, CompressionTransform, ProviderRegistry, RunRequest};
use tumbler_core::{
    AgentRole, ConversationMessage, Event, FailureReason, FileEntry, MessageMetadata, MessageRole, Phase,
    PhaseStatus, Project, ResourceLimits, Runtime as ProjectRuntime, SandboxMeta, SandboxPhase, SandboxResult,
    SandboxStrategy,
};
use tumbler_eventbus::EventBus;
use tumbler_sandbox::ContainerProxy;
use tumbler_scorer::{metric_score, resolve_score};
use tumbler_storage::{archive_staging, delete_tree, resolve_within, StateStore};

use crate::config::{LoopConfig, ModelConfig};
use crate::context::{architect_context, engineer_context, verifier_context};
use crate::decision::{decide, Decision};
use crate::error::LoopError;
use crate::plan::parse_plan_commands;
use crate::staging::{read_staging_listing, write_staging};

const INPUT_DIR: &str = "01_input";
const REQUIREMENTS_FILE: &str = "requirements.txt";
const PLAN_DIR: &str = "02_plan";
const PLAN_FILE: &str = "PLAN.md";
const STAGING_DIR: &str = "03_staging";
const FEEDBACK_DIR: &str = "04_feedback";
const FINAL_DIR: &str = "05_final";

/// Everything one project loop run needs, shared across every project the
/// engine drives.
#[derive(Clone)]
pub struct LoopCollaborators {
    pub store: Arc<StateStore>,
    pub bus: EventBus,
    pub providers: Arc<ProviderRegistry>,
    pub compression: Arc<dyn CompressionTransform>,
    pub proxy: Arc<dyn ContainerProxy>,
    pub models: ModelConfig,
    pub resources: ResourceLimits,
    pub config: LoopConfig,
}

/// A handle to a running project task. Dropping
/// it does not stop the loop; call [`LoopHandle::stop`] explicitly.
pub struct LoopHandle {
    name: String,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl LoopHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request a Stop: the in-flight
    /// agent stream or sandbox run is abandoned and the loop settles into
    /// `idle` rather than continuing.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop task to exit. Used by shutdown's bounded drain.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

/// Spawns and drives one project's feedback loop.
pub struct ProjectLoop;

impl ProjectLoop {
    /// Start driving `name` in its own task. The project must already have
    /// persisted state (created by the daemon) — this only runs the loop,
    /// it does not scaffold a new project.
    pub fn spawn(name: String, collaborators: LoopCollaborators) -> LoopHandle {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task_name = name.clone();
        let join = tokio::spawn(async move {
                run_with_timeout(&task_name, &collaborators, &task_cancel).await;
        });
        LoopHandle { name, cancel, join }
    }
}

async fn run_with_timeout(name: &str, collab: &LoopCollaborators, cancel: &CancellationToken) {
    let timeout = collab.config.project_timeout;
    tokio::select! {
        () = tokio::time::sleep(timeout) => {
            handle_timeout(name, collab, timeout).await;
        }
        () = run_project(name, collab, cancel) => {}
    }
}

async fn handle_timeout(name: &str, collab: &LoopCollaborators, timeout: std::time::Duration) {
    let Ok(Some(mut project)) = collab.store.load_state(name) else {
        return;
    };
    let reason = FailureReason::Timeout { elapsed_secs: timeout.as_secs() };
    project.mark_failed(reason.clone(), Utc::now());
    if collab.store.save_state(&project).is_ok() {
        collab
        .bus
        .publish(Event::ProjectFailed { project: name.to_string(), reason, timestamp: Utc::now() })
        .await;
    }
}

async fn run_project(name: &str, collab: &LoopCollaborators, cancel: &CancellationToken) {
    if let Err(error) = run_project_inner(name, collab, cancel).await {
        tracing::error!(project = name, %error, "feedback loop exited with an internal error");
        if let Ok(Some(mut project)) = collab.store.load_state(name) {
            let reason = FailureReason::Internal { message: error.to_string() };
            project.mark_failed(reason.clone(), Utc::now());
            if collab.store.save_state(&project).is_ok() {
                collab.bus.publish(Event::ProjectFailed { project: name.to_string(), reason, timestamp: Utc::now() }).await;
            }
        }
    }
}

async fn run_project_inner(name: &str, collab: &LoopCollaborators, cancel: &CancellationToken) -> Result<(), LoopError> {
    let store = &collab.store;
    let bus = &collab.bus;

    let mut project = store.load_state(name)?.ok_or_else(|| LoopError::MissingProject(name.to_string()))?;

    let workspace = project.workspace_root.clone();
    let requirements_path = workspace.join(INPUT_DIR).join(REQUIREMENTS_FILE);
    let plan_path = workspace.join(PLAN_DIR).join(PLAN_FILE);
    let staging_dir = workspace.join(STAGING_DIR);
    let feedback_dir = workspace.join(FEEDBACK_DIR);
    let final_dir = workspace.join(FINAL_DIR);

    set_phase(&mut project, Phase::Planning, 0, store, bus).await?;

    let requirements = std::fs::read_to_string(&requirements_path).unwrap_or_default();
    let architect_ctx = architect_context(&requirements, None, None);

    let plan_text = match run_agent_with_retry(
        name,
        AgentRole::Architect,
        0,
        &architect_ctx,
        collab,
        &project,
        cancel,
        |output| match output {
            AgentOutput::Plan(text) => Some(text),
            _ => None,
        },
    )
    .await
    {
        AgentOutcome::Output(text) => text,
        AgentOutcome::Cancelled => return cancelled_to_idle(&mut project, store, bus).await,
        AgentOutcome::Failed(reason) => return fail_project(&mut project, reason, store, bus).await,
    };

    std::fs::create_dir_all(workspace.join(PLAN_DIR))?;
    std::fs::write(&plan_path, &plan_text)?;
    let strategy = parse_plan_commands(&plan_text);

    let mut iteration: u32 = 1;
    loop {
        if cancel.is_cancelled() {
            return cancelled_to_idle(&mut project, store, bus).await;
        }

        project.iteration = iteration;
        set_phase(&mut project, Phase::Engineering, iteration, store, bus).await?;
        bus.publish(Event::IterationUpdate { project: name.to_string(), iteration, timestamp: Utc::now() }).await;

        let revising = iteration >= 2;
        let previous_staging =
        if revising { Some(read_staging_listing(&staging_dir)?) } else { None };
        let previous_feedback = if revising {
            Some(read_feedback_report(&feedback_dir, iteration - 1))
        } else {
            None
        };

        let engineer_ctx = engineer_context(iteration, &plan_text, previous_staging.as_deref(), previous_feedback.as_deref());

        let files = match run_agent_with_retry(
            name,
            AgentRole::Engineer,
            iteration,
            &engineer_ctx,
            collab,
            &project,
            cancel,
            |output| match output {
                AgentOutput::Files(files) => Some(files),
                _ => None,
            },
        )
        .await
        {
            AgentOutcome::Output(files) => files,
            AgentOutcome::Cancelled => return cancelled_to_idle(&mut project, store, bus).await,
            AgentOutcome::Failed(reason) => return fail_project(&mut project, reason, store, bus).await,
        };

        replace_staging(&workspace, &staging_dir, &files)?;

        if cancel.is_cancelled() {
            return cancelled_to_idle(&mut project, store, bus).await;
        }

        set_phase(&mut project, Phase::Verifying, iteration, store, bus).await?;

        let sandbox_result = match run_sandbox_phase(name, iteration, &staging_dir, &strategy, collab, cancel).await {
            SandboxOutcome::Ran(result) => {
                emit_sandbox_events(name, iteration, &result, store, bus).await?;
                Some(result)
            }
            SandboxOutcome::NoRuntime => None,
            SandboxOutcome::Cancelled => return cancelled_to_idle(&mut project, store, bus).await,
        };

        let metric = sandbox_result.as_ref().filter(|r| r.available).map(|r| metric_score(r).total());
        let verifier_ctx = verifier_context(&plan_text, sandbox_result, files);

        let report = match run_agent_with_retry(
            name,
            AgentRole::Verifier,
            iteration,
            &verifier_ctx,
            collab,
            &project,
            cancel,
            |output| match output {
                AgentOutput::Report(text) => Some(text),
                _ => None,
            },
        )
        .await
        {
            AgentOutcome::Output(text) => text,
            AgentOutcome::Cancelled => return cancelled_to_idle(&mut project, store, bus).await,
            AgentOutcome::Failed(reason) => return fail_project(&mut project, reason, store, bus).await,
        };

        std::fs::create_dir_all(&feedback_dir)?;
        std::fs::write(feedback_dir.join(format!("REPORT_iter{iteration}.md")), &report)?;

        let score = resolve_score(Some(&report), metric);
        project.last_score = Some(score);
        project.updated_at = Utc::now();
        store.save_state(&project)?;
        bus.publish(Event::ScoreUpdate { project: name.to_string(), iteration, score, phase: project.phase, timestamp: Utc::now() }).await;

        let total_cost = store.load_usage(name)?.total_cost;

        match decide(score, project.quality_threshold, iteration, project.max_iterations, total_cost, project.max_cost) {
            Decision::Completed => {
                project.mark_completed(score, Utc::now());
                store.save_state(&project)?;
                bus.publish(Event::PhaseChange { project: name.to_string(), phase: Phase::Completed, iteration, timestamp: Utc::now() }).await;

                let archive_path = archive_staging(&staging_dir, &final_dir, name, Utc::now())?;
                bus.publish(Event::ProjectComplete {
                        project: name.to_string(),
                        iteration,
                        score,
                        archive_path: archive_path.display().to_string(),
                        timestamp: Utc::now(),
                })
                .await;
                return Ok(());
            }
            Decision::Failed(kind) => {
                let reason = kind.into_reason(iteration, project.max_iterations, total_cost, project.max_cost);
                return fail_project(&mut project, reason, store, bus).await;
            }
            Decision::NextIteration => {
                iteration += 1;
            }
        }
    }
}

fn read_feedback_report(feedback_dir: &Path, iteration: u32) -> String {
    std::fs::read_to_string(feedback_dir.join(format!("REPORT_iter{iteration}.md"))).unwrap_or_default()
}

/// Clear the previous iteration's staging tree, then write the Engineer's
/// fresh output and `.manifest.json`.
fn replace_staging(workspace: &Path, staging_dir: &Path, files: &[FileEntry]) -> Result<(), LoopError> {
    if staging_dir.exists() {
        let resolved = resolve_within(workspace, staging_dir)?;
        delete_tree(&resolved, workspace)?;
    }
    write_staging(staging_dir, files, Utc::now())?;
    Ok(())
}

async fn set_phase(project: &mut Project, phase: Phase, iteration: u32, store: &StateStore, bus: &EventBus) -> Result<(), LoopError> {
    project.phase = phase;
    project.is_running = phase.is_active();
    project.updated_at = Utc::now();
    store.save_state(project)?;
    bus.publish(Event::PhaseChange { project: project.name.clone(), phase, iteration, timestamp: Utc::now() }).await;
    Ok(())
}

async fn cancelled_to_idle(project: &mut Project, store: &StateStore, bus: &EventBus) -> Result<(), LoopError> {
    project.phase = Phase::Idle;
    project.is_running = false;
    project.updated_at = Utc::now();
    store.save_state(project)?;
    bus.publish(Event::PhaseChange { project: project.name.clone(), phase: Phase::Idle, iteration: project.iteration, timestamp: Utc::now() }).await;
    Ok(())
}

async fn fail_project(project: &mut Project, reason: FailureReason, store: &StateStore, bus: &EventBus) -> Result<(), LoopError> {
    project.mark_failed(reason.clone(), Utc::now());
    store.save_state(project)?;
    bus.publish(Event::ProjectFailed { project: project.name.clone(), reason, timestamp: Utc::now() }).await;
    Ok(())
}

/// What one agent invocation, with its retry budget exhausted, settled on.
enum AgentOutcome<T> {
    Output(T),
    Cancelled,
    Failed(FailureReason),
}

/// Run one agent call, retrying on `AgentRunError` (other than cancellation)
/// up to `config.agent_retry_limit` extra times before giving up. Cancellation is never retried.
#[allow(clippy::too_many_arguments)]
async fn run_agent_with_retry<T>(
    name: &str,
    role: AgentRole,
    iteration: u32,
    context: &tumbler_core::AgentContext,
    collab: &LoopCollaborators,
    project: &Project,
    cancel: &CancellationToken,
    extract: impl Fn(AgentOutput) -> Option<T>,
) -> AgentOutcome<T> {
    let resolved = collab.models.resolve(role, &project.provider_overrides);
    let provider: Arc<dyn ChatProvider> = match collab.providers.get(&resolved.provider_id) {
        Ok(provider) => provider,
        Err(error) => return AgentOutcome::Failed(FailureReason::AgentError { message: error.to_string() }),
    };

    let mut attempts_left = 1 + collab.config.agent_retry_limit;
    loop {
        let request = RunRequest {
            project: name,
            role,
            iteration,
            context,
            model: &resolved.model,
            compression: &project.compression_config,
        };
        let outcome = tumbler_agents::run(&collab.store, &collab.bus, provider.as_ref(), collab.compression.as_ref(), request, cancel).await;
        match outcome {
            Ok(result) => {
                return match extract(result.output) {
                    Some(value) => AgentOutcome::Output(value),
                    None => AgentOutcome::Failed(FailureReason::AgentError {
                            message: format!("{role} returned a reply in an unexpected shape"),
                    }),
                };
            }
            Err(AgentRunError::Cancelled) => return AgentOutcome::Cancelled,
            Err(error) => {
                attempts_left -= 1;
                tracing::warn!(project = name, %role, attempts_left, %error, "agent call failed");
                if attempts_left == 0 {
                    return AgentOutcome::Failed(FailureReason::AgentError { message: error.to_string() });
                }
            }
        }
    }
}

/// Outcome of attempting a sandbox run for one iteration.
enum SandboxOutcome {
    Ran(SandboxResult),
    /// No marker file detected in staging; sandbox was never attempted.
    NoRuntime,
    Cancelled,
}

async fn run_sandbox_phase(
    name: &str,
    iteration: u32,
    staging_dir: &Path,
    strategy: &SandboxStrategy,
    collab: &LoopCollaborators,
    cancel: &CancellationToken,
) -> SandboxOutcome {
    let Some(runtime) = ProjectRuntime::detect(staging_dir) else {
        return SandboxOutcome::NoRuntime;
    };

    collab.bus.publish(Event::SandboxStart { project: name.to_string(), iteration, timestamp: Utc::now() }).await;

    tokio::select! {
        biased;
        () = cancel.cancelled() => SandboxOutcome::Cancelled,
        result = tumbler_sandbox::run(staging_dir, strategy, runtime, collab.resources, collab.proxy.clone()) => SandboxOutcome::Ran(result),
    }
}

async fn emit_sandbox_events(name: &str, iteration: u32, result: &SandboxResult, store: &StateStore, bus: &EventBus) -> Result<(), LoopError> {
    for phase in [SandboxPhase::Install, SandboxPhase::Build, SandboxPhase::Test, SandboxPhase::Lint] {
        let phase_result = result.phase(phase);
        let status = phase_result.status.unwrap_or(PhaseStatus::Skipped);
        let duration_s = phase_result.duration_ms as f64 / 1000.0;

        bus.publish(Event::SandboxPhase {
                project: name.to_string(),
                iteration,
                phase,
                status,
                stdout: phase_result.stdout.clone(),
                stderr: phase_result.stderr.clone(),
                exit_code: phase_result.exit_code,
                duration_s,
                commands: phase_result.commands.clone(),
                timestamp: Utc::now(),
        })
        .await;

        let message = ConversationMessage::new(AgentRole::System, MessageRole::Sandbox, iteration, format!("{phase} {status}"))
        .with_metadata(MessageMetadata {
                sandbox: Some(SandboxMeta {
                        phase: Some(phase.to_string()),
                        status: Some(status.to_string()),
                        exit_code: phase_result.exit_code,
                        duration_ms: Some(phase_result.duration_ms),
                        commands: Some(phase_result.commands.clone()),
                }),
                ..Default::default()
        });
        store.append_conversation(name, message)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
