// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: a YAML file plus environment-variable
//! interpolation for secrets (the documented contract "Environment" — "YAML is parsed with
//! a safe loader (no code evaluation). Secrets are never written to state,
//! conversation, or logs.").
//!
//! `serde_yaml` never evaluates code, satisfying the safe-loader
//! requirement outright; the interpolation pass below resolves `${VAR}`
//! references against the process environment before the document is
//! deserialized, so a secret lives only in the environment and in the
//! in-memory [`Config`] value — never echoed back into a file this
//! process writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tumbler_agents::providers::{AnthropicProvider, GeminiProvider, OpenAiCompatibleProvider};
use tumbler_agents::{ChatProvider, ProviderRegistry};
use tumbler_core::ResourceLimits;
use tumbler_engine::{AgentRoleConfig, LoopConfig, ModelConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
    #[error("environment variable {0:?} referenced in config is not set")]
    MissingEnvVar(String),
    #[error("provider {id:?} has unknown kind {kind:?}")]
    UnknownProviderKind { id: String, kind: String },
}

/// One entry in `providers:` — enough to build a concrete [`ChatProvider`]
///.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProviderSpec {
    pub id: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub input_price_per_m: f64,
    #[serde(default)]
    pub output_price_per_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    Gemini,
    OpenAiCompatible,
    Local,
}

fn default_max_concurrent_projects() -> usize {
    3
}

fn default_sandbox_proxy_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_drain_secs() -> u64 {
    10
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawModelConfig {
    pub provider_id: String,
    pub model: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawModelAssignments {
    pub architect: RawModelConfig,
    pub engineer: RawModelConfig,
    pub verifier: RawModelConfig,
}

/// Deserialized shape of the YAML document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub workspace_root: PathBuf,
    #[serde(default = "default_max_concurrent_projects")]
    pub max_concurrent_projects: usize,
    #[serde(default = "default_sandbox_proxy_url")]
    pub sandbox_proxy_url: String,
    #[serde(default)]
    pub resource_limits: ResourceLimits,
    #[serde(default = "default_drain_secs")]
    pub shutdown_drain_secs: u64,
    #[serde(default)]
    pub agent_retry_limit: Option<u32>,
    #[serde(default)]
    pub project_timeout_secs: Option<u64>,
    #[serde(default)]
    pub watcher_debounce_ms: Option<u64>,
    pub providers: Vec<ProviderSpec>,
    pub models: RawModelAssignments,
}

/// Walk a parsed YAML value, replacing every `${VAR}` occurrence in string
/// scalars with the value of the `VAR` environment variable. Mirrors the
/// spec's "environment-variable interpolation for secrets" requirement
/// without ever invoking a YAML-embedded expression language.
fn interpolate(value: serde_yaml::Value) -> Result<serde_yaml::Value, ConfigError> {
    match value {
        serde_yaml::Value::String(s) => Ok(serde_yaml::Value::String(interpolate_str(&s)?)),
        serde_yaml::Value::Sequence(items) => {
            Ok(serde_yaml::Value::Sequence(items.into_iter().map(interpolate).collect::<Result<_, _>>()?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in map {
                out.insert(interpolate(k)?, interpolate(v)?);
            }
            Ok(serde_yaml::Value::Mapping(out))
        }
        other => Ok(other),
    }
}

fn interpolate_str(raw: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            out.push_str(rest);
            return Ok(out);
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + end];
        let value = std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))?;
        out.push_str(&value);
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

impl Config {
    /// Load and interpolate a YAML config file. Secrets pulled in
    /// via `${VAR}` never round-trip back into the file; only the live
    /// [`Config`] value (and, downstream, concrete provider clients) sees them.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let raw: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        let interpolated = interpolate(raw)?;
        serde_yaml::from_value(interpolated).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn loop_config(&self) -> LoopConfig {
        let defaults = LoopConfig::default();
        LoopConfig {
            agent_retry_limit: self.agent_retry_limit.unwrap_or(defaults.agent_retry_limit),
            project_timeout: self.project_timeout_secs.map(Duration::from_secs).unwrap_or(defaults.project_timeout),
            watcher_debounce: self.watcher_debounce_ms.map(Duration::from_millis).unwrap_or(defaults.watcher_debounce),
        }
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            architect: AgentRoleConfig { provider_id: self.models.architect.provider_id.clone(), model: self.models.architect.model.clone() },
            engineer: AgentRoleConfig { provider_id: self.models.engineer.provider_id.clone(), model: self.models.engineer.model.clone() },
            verifier: AgentRoleConfig { provider_id: self.models.verifier.provider_id.clone(), model: self.models.verifier.model.clone() },
        }
    }

    /// Build the concrete provider registry from `providers:`.
    pub fn build_provider_registry(&self) -> Result<ProviderRegistry, ConfigError> {
        let mut registry = ProviderRegistry::new();
        for spec in &self.providers {
            let provider: Arc<dyn ChatProvider> = build_provider(spec)?;
            registry.register(provider);
        }
        Ok(registry)
    }
}

fn build_provider(spec: &ProviderSpec) -> Result<Arc<dyn ChatProvider>, ConfigError> {
    match spec.kind {
        ProviderKind::Anthropic => {
            let key = spec.api_key.clone().unwrap_or_default();
            Ok(Arc::new(AnthropicProvider::new(key, spec.input_price_per_m, spec.output_price_per_m)))
        }
        ProviderKind::Gemini => {
            let key = spec.api_key.clone().unwrap_or_default();
            Ok(Arc::new(GeminiProvider::new(key, spec.input_price_per_m, spec.output_price_per_m)))
        }
        ProviderKind::Local => {
            let base_url = spec.base_url.clone().unwrap_or_else(|| "http://127.0.0.1:11434/v1".to_string());
            Ok(Arc::new(OpenAiCompatibleProvider::local(spec.id.clone(), base_url)))
        }
        ProviderKind::OpenAiCompatible => {
            let base_url = spec.base_url.clone().ok_or_else(|| ConfigError::UnknownProviderKind {
                    id: spec.id.clone(),
                    kind: "openai_compatible (missing base_url)".to_string(),
            })?;
            let key = spec.api_key.clone().unwrap_or_default();
            Ok(Arc::new(OpenAiCompatibleProvider::hosted(
                        spec.id.clone(),
                        base_url,
                        key,
                        spec.input_price_per_m,
                        spec.output_price_per_m,
            )))
        }
    }
}

/// Per-agent-role `provider_id -> HashMap` built from the YAML assignments,
/// used only to validate that every assigned provider id is actually
/// present in `providers:` before the daemon starts.
pub fn validate_model_assignments(config: &Config) -> Result<(), ConfigError> {
    let known: HashMap<&str, ()> = config.providers.iter().map(|p| (p.id.as_str(), ())).collect();
    for (role, assignment) in [
        ("architect", &config.models.architect),
        ("engineer", &config.models.engineer),
        ("verifier", &config.models.verifier),
    ] {
        if !known.contains_key(assignment.provider_id.as_str()) {
            return Err(ConfigError::UnknownProviderKind {
                    id: assignment.provider_id.clone(),
                    kind: format!("{role} model assignment references an undeclared provider"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
