// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Orchestrator Daemon: discovers projects, owns the
//! `name -> LoopHandle` registry behind a bounded concurrency pool, and is
//! the single point every control action (Start, Stop, Reset, Delete,
//! UpdateProviders, UpdateCompression) and status query goes through.
//!
//! Grounded on the teacher's daemon-state shape (a materialized registry
//! guarded by a lock, with startup reconciliation run once before the
//! control surface opens) generalized from one shared mutex over a job map
//! to a bounded semaphore plus one lock per running project, since spec
//! §5 requires N projects to run *concurrently*, not one job loop at a time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};

use tumbler_core::{CompressionConfig, Project, ProjectConfig};
use tumbler_engine::{LoopCollaborators, LoopHandle, ProjectLoop};
use tumbler_eventbus::EventBus;
use tumbler_storage::{StateStore, StoreError};
use tumbler_wire::ProjectListEntry;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("project {0:?} already exists")]
    AlreadyExists(String),
    #[error("project {0:?} not found")]
    NotFound(String),
    #[error("project name {0:?} is not a URL-safe identifier")]
    InvalidName(String),
    #[error("the running-project pool is full")]
    AtCapacity,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One running (or just-finished) project's loop handle plus the acquired
/// concurrency permit it holds for as long as it runs.
struct RunningLoop {
    handle: LoopHandle,
    _permit: tokio::sync::OwnedSemaphorePermit,
}

/// The top-level scheduler. Cheaply cloneable; every clone
/// shares the same registry, pool, and collaborators.
#[derive(Clone)]
pub struct Orchestrator {
    workspace_root: PathBuf,
    store: Arc<StateStore>,
    bus: EventBus,
    collaborators: LoopCollaborators,
    pool: Arc<Semaphore>,
    capacity: usize,
    running: Arc<Mutex<HashMap<String, RunningLoop>>>,
    started_at: Instant,
}

impl Orchestrator {
    pub fn new(
        workspace_root: PathBuf,
        store: Arc<StateStore>,
        bus: EventBus,
        collaborators: LoopCollaborators,
        max_concurrent_projects: usize,
    ) -> Self {
        Self {
            workspace_root,
            store,
            bus,
            collaborators,
            pool: Arc::new(Semaphore::new(max_concurrent_projects)),
            capacity: max_concurrent_projects,
            running: Arc::new(Mutex::new(HashMap::new())),
            started_at: Instant::now(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Startup reconciliation.
    ///
    /// This build does not resume a loop mid-phase across a daemon restart
    /// (no in-flight agent stream or sandbox session survives the process),
    /// so every project found `is_running` is cleared and left in its
    /// last-persisted phase; an operator (or the File Watcher) explicitly
    /// restarts it (Open Question decision, see `DESIGN.md`).
    pub async fn reconcile_on_startup(&self) -> Result<usize, OrchestratorError> {
        let mut reconciled = 0;
        for summary in self.store.list_projects()? {
            if let Some(mut project) = self.store.load_state(&summary.name)? {
                if project.is_running {
                    project.is_running = false;
                    project.updated_at = Utc::now();
                    self.store.save_state(&project)?;
                    reconciled += 1;
                    tracing::info!(project = %summary.name, "cleared stale is_running flag on startup");
                }
            }
        }
        Ok(reconciled)
    }

    fn project_root(&self, name: &str) -> PathBuf {
        self.workspace_root.join(name)
    }

    /// Create a brand-new project.
    pub async fn create_project(&self, name: &str, requirements: &str, config: ProjectConfig) -> Result<(), OrchestratorError> {
        if !tumbler_core::is_url_safe_name(name) {
            return Err(OrchestratorError::InvalidName(name.to_string()));
        }
        if self.store.load_state(name)?.is_some() {
            return Err(OrchestratorError::AlreadyExists(name.to_string()));
        }
        let root = self.project_root(name);
        std::fs::create_dir_all(root.join("01_input"))?;
        std::fs::write(root.join("01_input").join("requirements.txt"), requirements)?;
        let project = Project::new(name, root, config, Utc::now());
        self.store.save_state(&project)?;
        Ok(())
    }

    /// Start a project's feedback loop.
    ///
    /// If the project does not exist yet, it is created from `requirements`
    /// first (mirrors `tumbler-wire::Request::Start`'s "written... if the
    /// file does not already exist" contract, extended to cover the state
    /// file itself so the File Watcher's `RequirementsCreated` trigger and
    /// this call are equivalent entry points, the documented contract "Filesystem-as-IPC").
    pub async fn start(&self, name: &str, requirements: Option<&str>) -> Result<(), OrchestratorError> {
        if self.store.load_state(name)?.is_none() {
            self.create_project(name, requirements.unwrap_or_default(), ProjectConfig::default()).await?;
        }

        let mut running = self.running.lock().await;
        if let Some(existing) = running.get(name) {
            if !existing.handle.is_finished() {
                return Ok(()); // idempotent: already running
            }
            running.remove(name);
        }

        let permit = self.pool.clone().try_acquire_owned().map_err(|_| OrchestratorError::AtCapacity)?;
        let handle = ProjectLoop::spawn(name.to_string(), self.collaborators.clone());
        running.insert(name.to_string(), RunningLoop { handle, _permit: permit });
        Ok(())
    }

    /// Signal Stop. Synchronous with
    /// respect to issuing the signal; the loop settles into `idle`
    /// asynchronously after in-flight work unwinds.
    pub async fn stop(&self, name: &str) -> Result<(), OrchestratorError> {
        let running = self.running.lock().await;
        if let Some(running_loop) = running.get(name) {
            running_loop.handle.stop();
        }
        Ok(())
    }

    /// Wait for a project's loop task to actually exit, if one is tracked.
    /// Used by Reset/Delete (which must not race a live loop) and shutdown.
    async fn stop_and_join(&self, name: &str) {
        let handle = {
            let mut running = self.running.lock().await;
            running.remove(name)
        };
        if let Some(running_loop) = handle {
            running_loop.handle.stop();
            running_loop.handle.join().await;
        }
    }

    /// Lifecycle Reset: stop first if running, clear working
    /// directories, return phase to idle/iteration 0.
    pub async fn reset(&self, name: &str) -> Result<(), OrchestratorError> {
        self.stop_and_join(name).await;
        let mut project = self.store.load_state(name)?.ok_or_else(|| OrchestratorError::NotFound(name.to_string()))?;
        self.store.reset_project(name)?;
        project.reset(Utc::now());
        self.store.save_state(&project)?;
        Ok(())
    }

    /// Lifecycle Delete: stop first if running, then remove the
    /// entire project tree.
    pub async fn delete(&self, name: &str) -> Result<(), OrchestratorError> {
        self.stop_and_join(name).await;
        self.store.delete_project(name)?;
        Ok(())
    }

    pub async fn update_providers(&self, name: &str, overrides: HashMap<tumbler_core::AgentRole, String>) -> Result<(), OrchestratorError> {
        let mut project = self.store.load_state(name)?.ok_or_else(|| OrchestratorError::NotFound(name.to_string()))?;
        project.provider_overrides = overrides;
        project.updated_at = Utc::now();
        self.store.save_state(&project)?;
        Ok(())
    }

    pub async fn update_compression(&self, name: &str, compression: CompressionConfig) -> Result<(), OrchestratorError> {
        let mut project = self.store.load_state(name)?.ok_or_else(|| OrchestratorError::NotFound(name.to_string()))?;
        project.compression_config = compression;
        project.updated_at = Utc::now();
        self.store.save_state(&project)?;
        Ok(())
    }

    pub fn get_project(&self, name: &str) -> Result<Option<Project>, OrchestratorError> {
        Ok(self.store.load_state(name)?)
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectListEntry>, OrchestratorError> {
        Ok(self
            .store
            .list_projects()?
            .into_iter()
            .map(|summary| ProjectListEntry { name: summary.name, phase: summary.phase, iteration: summary.iteration })
            .collect())
    }

    pub async fn projects_running(&self) -> usize {
        self.running.lock().await.values().filter(|r| !r.handle.is_finished()).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Shutdown.
    pub async fn shutdown(&self, drain: Duration, kill: bool) {
        let handles: Vec<LoopHandle> = {
            let mut running = self.running.lock().await;
            running.drain().map(|(_, r)| r.handle).collect()
        };
        for handle in &handles {
            handle.stop();
        }
        if kill {
            return;
        }
        let deadline = tokio::time::sleep(drain);
        tokio::pin!(deadline);
        let mut joins = futures_join_all(handles);
        tokio::select! {
            () = &mut deadline => {
                tracing::warn!("shutdown drain interval elapsed with loops still running, forcing exit");
            }
            () = &mut joins => {}
        }
    }
}

/// Small local stand-in for `futures::future::join_all` over
/// non-`Unpin`-agnostic `LoopHandle::join` futures, avoiding pulling the
/// whole `futures` crate into this crate for one call site.
async fn futures_join_all(handles: Vec<LoopHandle>) {
    for handle in handles {
        handle.join().await;
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
