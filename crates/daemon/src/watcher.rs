// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The File Watcher: a filesystem monitor that complements the
//! (out-of-scope) HTTP API by watching every project for externally
//! created trigger files and dispatching loop advancement.
//!
//! Grounded on the native-OS recursive watch + debounced-poll shape used
//! elsewhere in the corpus for config hot-reload (`notify::RecommendedWatcher`
//! driving an mpsc channel), adapted here to watch the whole workspace root
//! recursively and classify each changed path into a per-project trigger.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Which of the three trigger files appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// `01_input/requirements.txt` appearing: idle → planning.
    RequirementsCreated,
    /// `02_plan/PLAN.md` appearing while idle: advance to engineering.
    PlanCreated,
    /// `03_staging/.manifest.json` appearing while idle: advance to verifying.
    ManifestCreated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub project: String,
    pub kind: TriggerKind,
}

fn classify(workspace_root: &Path, path: &Path) -> Option<Trigger> {
    let relative = path.strip_prefix(workspace_root).ok()?;
    let mut components = relative.components();
    let project = components.next()?.as_os_str().to_str()?.to_string();
    let rest: PathBuf = components.collect();
    let kind = match rest.to_str()? {
        "01_input/requirements.txt" => TriggerKind::RequirementsCreated,
        "02_plan/PLAN.md" => TriggerKind::PlanCreated,
        "03_staging/.manifest.json" => TriggerKind::ManifestCreated,
        _ => return None,
    };
    Some(Trigger { project, kind })
}

/// Watches a workspace root recursively for the three trigger files and
/// emits debounced, deduplicated [`Trigger`]s on `rx`.
///
/// Debouncing: rapid repeated events for the same
/// trigger within the debounce window coalesce into a single dispatch.
/// Whether the resulting trigger is itself a no-op (the loop is already
/// running, or the phase no longer matches) is the orchestrator's call —
/// the watcher only guarantees it will not fire the same trigger twice in
/// one debounce window.
pub struct ProjectWatcher {
    _watcher: RecommendedWatcher,
}

impl ProjectWatcher {
    pub fn watch(workspace_root: PathBuf, debounce: Duration) -> Result<(Self, mpsc::Receiver<Trigger>), notify::Error> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<NotifyEvent>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<NotifyEvent>| {
                if let Ok(event) = res {
                    let _ = raw_tx.send(event);
                }
        })?;
        if workspace_root.exists() {
            watcher.watch(&workspace_root, RecursiveMode::Recursive)?;
        }

        let (trigger_tx, trigger_rx) = mpsc::channel(64);
        tokio::spawn(async move {
                let mut last_fired: HashMap<Trigger, Instant> = HashMap::new();
                while let Some(event) = raw_rx.recv().await {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        continue;
                    }
                    for path in &event.paths {
                        let Some(trigger) = classify(&workspace_root, path) else { continue };
                        let now = Instant::now();
                        let fire = match last_fired.get(&trigger) {
                            Some(previous) => now.duration_since(*previous) >= debounce,
                            None => true,
                        };
                        if fire {
                            last_fired.insert(trigger.clone(), now);
                            if trigger_tx.send(trigger).await.is_err() {
                                return;
                            }
                        }
                    }
                }
        });

        Ok((Self { _watcher: watcher }, trigger_rx))
    }
}

impl std::hash::Hash for Trigger {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.project.hash(state);
        (self.kind as u8).hash(state);
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
