use super::*;

#[test]
fn defaults_match_spec() {
    let config = LoopConfig::default();
    assert_eq!(config.agent_retry_limit, 1);
    assert_eq!(config.project_timeout, Duration::from_secs(3600));
    assert_eq!(config.watcher_debounce, Duration::from_secs(2));
}

fn role_config(provider_id: &str) -> AgentRoleConfig {
    AgentRoleConfig { provider_id: provider_id.to_string(), model: "default-model".to_string() }
}

fn model_config() -> ModelConfig {
    ModelConfig {
        architect: role_config("anthropic"),
        engineer: role_config("anthropic"),
        verifier: role_config("anthropic"),
    }
}

#[test]
fn resolve_without_override_uses_role_default() {
    let config = model_config();
    let resolved = config.resolve(AgentRole::Architect, &HashMap::new());
    assert_eq!(resolved.provider_id, "anthropic");
    assert_eq!(resolved.model, "default-model");
}

#[test]
fn resolve_with_override_replaces_provider_but_keeps_model() {
    let config = model_config();
    let mut overrides = HashMap::new();
    overrides.insert(AgentRole::Engineer, "openai".to_string());
    let resolved = config.resolve(AgentRole::Engineer, &overrides);
    assert_eq!(resolved.provider_id, "openai");
    assert_eq!(resolved.model, "default-model");
}

#[test]
fn resolve_system_role_falls_back_to_verifier_config() {
    let config = model_config();
    let resolved = config.resolve(AgentRole::System, &HashMap::new());
    assert_eq!(resolved.provider_id, config.verifier.provider_id);
}
