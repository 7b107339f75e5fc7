// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The root entity: a project under management by the feedback loop.

use crate::conversation::AgentRole;
use crate::phase::{FailureReason, Phase};
use std::collections::HashMap;
use std::path::PathBuf;

/// Pass-through configuration for the (out-of-scope) prompt-compression subsystem.
///
/// The core never inspects `options`; it is forwarded to the compression
/// transform verbatim. `enabled` gates whether `<compress>` markers are
/// honored at all for a project (§4.5).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompressionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// A project's invariants were violated; see §8 "Quantified invariants".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectInvariant {
    #[error("iteration {iteration} exceeds max_iterations {max_iterations}")]
    IterationExceedsMax { iteration: u32, max_iterations: u32 },
    #[error("phase is completed but last_score {last_score:?} is below quality_threshold {quality_threshold}")]
    CompletedBelowThreshold { last_score: Option<f64>, quality_threshold: f64 },
    #[error("is_running is true but phase {phase} is not an active phase")]
    RunningInInactivePhase { phase: Phase },
    #[error("project name {0:?} is not a URL-safe identifier")]
    InvalidName(String),
}

/// Returns true if `name` is a URL-safe identifier: ASCII alphanumerics,
/// `-` and `_` only, non-empty, and does not start with `.`.
pub fn is_url_safe_name(name: &str) -> bool {
    !name.is_empty()
    && !name.starts_with('.')
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Configuration supplied at creation time and mutable via `UpdateProviders`
/// / `UpdateCompression` operator actions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default)]
    pub max_cost: f64,
    #[serde(default)]
    pub provider_overrides: HashMap<AgentRole, String>,
    #[serde(default)]
    pub compression_config: CompressionConfig,
}

fn default_max_iterations() -> u32 {
    5
}

fn default_quality_threshold() -> f64 {
    8.0
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            quality_threshold: default_quality_threshold(),
            max_cost: 0.0,
            provider_overrides: HashMap::new(),
            compression_config: CompressionConfig::default(),
        }
    }
}

/// The root entity. Persisted verbatim as `.tumbler/state.json`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    pub name: String,
    pub workspace_root: PathBuf,
    pub phase: Phase,
    pub iteration: u32,
    pub max_iterations: u32,
    pub quality_threshold: f64,
    pub max_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_score: Option<f64>,
    #[serde(default)]
    pub provider_overrides: HashMap<AgentRole, String>,
    #[serde(default)]
    pub compression_config: CompressionConfig,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    #[serde(default)]
    pub is_running: bool,
    /// Unknown fields round-trip untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Seed a brand-new project: phase=idle, iteration=0 (Lifecycle, the documented contract).
    pub fn new(name: impl Into<String>, workspace_root: PathBuf, config: ProjectConfig, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            name: name.into(),
            workspace_root,
            phase: Phase::Idle,
            iteration: 0,
            max_iterations: config.max_iterations,
            quality_threshold: config.quality_threshold,
            max_cost: config.max_cost,
            last_score: None,
            provider_overrides: config.provider_overrides,
            compression_config: config.compression_config,
            started_at: now,
            updated_at: now,
            error_message: None,
            failure: None,
            is_running: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Check the data-model invariants from the documented contract / §8 item 1–2.
    pub fn validate(&self) -> Result<(), ProjectInvariant> {
        if !is_url_safe_name(&self.name) {
            return Err(ProjectInvariant::InvalidName(self.name.clone()));
        }
        if self.iteration > self.max_iterations {
            return Err(ProjectInvariant::IterationExceedsMax {
                    iteration: self.iteration,
                    max_iterations: self.max_iterations,
            });
        }
        if matches!(self.phase, Phase::Completed) {
            let ok = self.last_score.map(|s| s >= self.quality_threshold).unwrap_or(false);
            if !ok {
                return Err(ProjectInvariant::CompletedBelowThreshold {
                        last_score: self.last_score,
                        quality_threshold: self.quality_threshold,
                });
            }
        }
        if self.is_running && !self.phase.is_active() {
            return Err(ProjectInvariant::RunningInInactivePhase { phase: self.phase });
        }
        Ok(())
    }

    /// Lifecycle Reset: phase→idle, iteration→0, scores/errors cleared.
    /// Requirements and final archives live on disk and are untouched here;
    /// the storage layer clears `02_plan/`, `03_staging/`, `04_feedback/`,
    /// `usage.json`, and `conversation.json` separately.
    pub fn reset(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.phase = Phase::Idle;
        self.iteration = 0;
        self.last_score = None;
        self.error_message = None;
        self.failure = None;
        self.is_running = false;
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, reason: FailureReason, now: chrono::DateTime<chrono::Utc>) {
        self.error_message = Some(reason.to_string());
        self.failure = Some(reason);
        self.phase = Phase::Failed;
        self.is_running = false;
        self.updated_at = now;
    }

    pub fn mark_completed(&mut self, score: f64, now: chrono::DateTime<chrono::Utc>) {
        self.phase = Phase::Completed;
        self.last_score = Some(score);
        self.is_running = false;
        self.updated_at = now;
    }
}

crate::builder! {
    pub struct ProjectBuilder => Project {
        into { name: String = "demo" }
        set { workspace_root: PathBuf = PathBuf::from("/tmp/demo") }
        set { phase: Phase = Phase::Idle }
        set { iteration: u32 = 0 }
        set { max_iterations: u32 = 5 }
        set { quality_threshold: f64 = 8.0 }
        set { max_cost: f64 = 0.0 }
        option { last_score: f64 = None }
        set { provider_overrides: HashMap<AgentRole, String> = HashMap::new() }
        set { compression_config: CompressionConfig = CompressionConfig::default() }
        set { started_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now() }
        set { updated_at: chrono::DateTime<chrono::Utc> = chrono::Utc::now() }
        option { error_message: String = None }
        option { failure: FailureReason = None }
        set { is_running: bool = false }
        set { extra: serde_json::Map<String, serde_json::Value> = serde_json::Map::new() }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
