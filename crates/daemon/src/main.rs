// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tumblerd`: the Orchestrator Daemon process.
//!
//! Startup order follows the teacher's lifecycle shape — acquire the lock
//! file before touching anything else, so two daemons racing for the same
//! state directory fail fast instead of corrupting each other's writes;
//! bind the control socket last, only once every fallible step ahead of it
//! has succeeded.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use tokio_util::sync::CancellationToken;

use tumbler_agents::PassthroughCompression;
use tumbler_daemon::{env, Config, Orchestrator};
use tumbler_engine::LoopCollaborators;
use tumbler_eventbus::EventBus;
use tumbler_sandbox::HttpContainerProxy;
use tumbler_storage::StateStore;

const LOCK_FILE: &str = "daemon.pid";
const LOG_FILE: &str = "daemon.log";

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let state_dir = env::state_dir();
    if let Err(error) = std::fs::create_dir_all(&state_dir) {
        eprintln!("tumblerd: failed to create state directory {}: {error}", state_dir.display());
        return 1;
    }

    let _log_guard = init_logging(&state_dir);

    let lock_file = match acquire_lock(&state_dir) {
        Ok(file) => file,
        Err(error) => {
            tracing::error!(%error, "another tumblerd instance already holds the lock");
            return 1;
        }
    };

    let config_path = env::config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(path = %config_path.display(), %error, "failed to load daemon configuration");
            release_lock(&state_dir, lock_file);
            return 1;
        }
    };

    if let Err(error) = tumbler_daemon::config::validate_model_assignments(&config) {
        tracing::error!(%error, "daemon configuration references an undeclared provider");
        release_lock(&state_dir, lock_file);
        return 1;
    }

    if !config.workspace_root.exists() {
        tracing::error!(workspace = %config.workspace_root.display(), "workspace root does not exist");
        release_lock(&state_dir, lock_file);
        return 1;
    }

    if let Err(error) = check_sandbox_proxy(&config.sandbox_proxy_url).await {
        tracing::error!(proxy = %config.sandbox_proxy_url, %error, "container proxy unreachable at startup check");
        release_lock(&state_dir, lock_file);
        return 1;
    }

    let providers = match config.build_provider_registry() {
        Ok(registry) => registry,
        Err(error) => {
            tracing::error!(%error, "failed to build provider registry");
            release_lock(&state_dir, lock_file);
            return 1;
        }
    };

    let store = Arc::new(StateStore::new(config.workspace_root.clone()));
    let bus = EventBus::default();
    let proxy = Arc::new(HttpContainerProxy::new(config.sandbox_proxy_url.clone()));
    let collaborators = LoopCollaborators {
        store: store.clone(),
        bus: bus.clone(),
        providers: Arc::new(providers),
        compression: Arc::new(PassthroughCompression),
        proxy,
        models: config.model_config(),
        resources: config.resource_limits,
        config: config.loop_config(),
    };

    let orchestrator = Orchestrator::new(
        config.workspace_root.clone(),
        store,
        bus,
        collaborators,
        config.max_concurrent_projects,
    );

    match orchestrator.reconcile_on_startup().await {
        Ok(reconciled) if reconciled > 0 => tracing::info!(reconciled, "cleared stale is_running flags on startup"),
        Ok(_) => {}
        Err(error) => tracing::warn!(%error, "startup reconciliation failed, continuing anyway"),
    }

    let shutdown = CancellationToken::new();
    let socket_path = env::socket_path();

    let watcher_result = tumbler_daemon::ProjectWatcher::watch(config.workspace_root.clone(), config.loop_config().watcher_debounce);
    let watcher = match watcher_result {
        Ok((watcher, mut triggers)) => {
            let orchestrator = orchestrator.clone();
            let watcher_shutdown = shutdown.clone();
            tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            () = watcher_shutdown.cancelled() => break,
                            trigger = triggers.recv() => {
                                let Some(trigger) = trigger else { break };
                                if let Err(error) = orchestrator.start(&trigger.project, None).await {
                                    tracing::debug!(project = %trigger.project, %error, "file-watcher trigger did not start a loop");
                                }
                            }
                        }
                    }
            });
            Some(watcher)
        }
        Err(error) => {
            tracing::warn!(%error, "file watcher failed to start; workspace triggers are disabled for this run");
            None
        }
    };

    tracing::info!(socket = %socket_path.display(), workspace = %config.workspace_root.display(), "tumblerd started");

    let server_shutdown = shutdown.clone();
    let server_orchestrator = orchestrator.clone();
    let server = tokio::spawn(async move { tumbler_daemon::serve(&socket_path, server_orchestrator, server_shutdown).await });

    wait_for_shutdown_signal(&shutdown).await;

    tracing::info!("shutdown requested, draining running projects");
    orchestrator.shutdown(std::time::Duration::from_secs(config.shutdown_drain_secs), false).await;
    drop(watcher);

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::warn!(%error, "control socket server exited with an error"),
        Err(error) => tracing::warn!(%error, "control socket server task panicked"),
    }

    release_lock(&state_dir, lock_file);
    tracing::info!("tumblerd shut down cleanly");
    0
}

#[cfg(unix)]
async fn wait_for_shutdown_signal(shutdown: &CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sig) => sig,
        Err(error) => {
            tracing::warn!(%error, "failed to install SIGTERM handler");
            shutdown.cancelled().await;
            return;
        }
    };
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = tokio::signal::ctrl_c() => {}
        () = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal(shutdown: &CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        () = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}

/// Acquire the daemon's single-instance lock, writing our PID once it is
/// held.
fn acquire_lock(state_dir: &std::path::Path) -> std::io::Result<std::fs::File> {
    let path = state_dir.join(LOCK_FILE);
    let file = OpenOptions::new().write(true).create(true).truncate(false).open(&path)?;
    file.try_lock_exclusive().map_err(|_| std::io::Error::new(std::io::ErrorKind::WouldBlock, "lock held by another process"))?;
    let mut file = file;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

fn release_lock(state_dir: &std::path::Path, lock_file: std::fs::File) {
    drop(lock_file);
    let _ = std::fs::remove_file(state_dir.join(LOCK_FILE));
}

/// A short, best-effort GET against the proxy's root, solely to decide
/// whether to fail startup. A reachable-but-erroring proxy is not
/// fatal here — only a connection failure is, since that is the condition
/// the spec calls out by name ("container proxy unreachable").
async fn check_sandbox_proxy(base_url: &str) -> Result<(), reqwest::Error> {
    let client = reqwest::Client::builder().timeout(std::time::Duration::from_secs(3)).build()?;
    match client.get(format!("{base_url}/v1/health")).send().await {
        Ok(_) => Ok(()),
        Err(error) if error.is_connect() => Err(error),
        Err(_) => Ok(()),
    }
}

/// Non-blocking file appender plus stderr, filtered by `RUST_LOG`
/// (defaulting to `info`). The returned guard must stay alive for the
/// duration of `main` — dropping it early silently stops flushing.
fn init_logging(state_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
    .with_writer(non_blocking)
    .with_ansi(false)
    .with_target(false)
    .init();
    guard
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
