// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_yaml(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    write!(file, "{contents}").expect("write");
    file
}

const BASE_YAML: &str = r#"
workspace_root: /tmp/tumbler-workspace
sandbox_proxy_url: http://proxy.local:9000
providers:
- id: anthropic
kind: anthropic
api_key: ${TEST_TUMBLER_API_KEY}
input_price_per_m: 3.0
output_price_per_m: 15.0
models:
architect:
provider_id: anthropic
model: claude-test
engineer:
provider_id: anthropic
model: claude-test
verifier:
provider_id: anthropic
model: claude-test
"#;

#[test]
#[serial]
fn load_fails_on_missing_env_var() {
    let yaml = BASE_YAML.replace("${TEST_TUMBLER_API_KEY}", "${NONEXISTENT_TUMBLER_VAR}");
    let file = write_yaml(&yaml);
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(var) if var == "NONEXISTENT_TUMBLER_VAR"));
}

#[test]
#[serial]
fn load_interpolates_env_var_without_leaking_into_file() {
    std::env::set_var("TEST_TUMBLER_API_KEY", "sk-secret-value");
    let file = write_yaml(BASE_YAML);
    let config = Config::load(file.path()).expect("load");
    assert_eq!(config.providers[0].api_key.as_deref(), Some("sk-secret-value"));
    let on_disk = std::fs::read_to_string(file.path()).expect("read back");
    assert!(!on_disk.contains("sk-secret-value"));
    std::env::remove_var("TEST_TUMBLER_API_KEY");
}

#[test]
#[serial]
fn default_limits_and_concurrency_apply_when_unset() {
    std::env::set_var("TEST_TUMBLER_API_KEY", "sk-secret-value");
    let file = write_yaml(BASE_YAML);
    let config = Config::load(file.path()).expect("load");
    assert_eq!(config.max_concurrent_projects, 3);
    assert_eq!(config.resource_limits.cpus, 1.0);
    assert_eq!(config.resource_limits.memory_mb, 1024);
    std::env::remove_var("TEST_TUMBLER_API_KEY");
}

#[test]
#[serial]
fn loop_config_overrides_apply_when_set() {
    std::env::set_var("TEST_TUMBLER_API_KEY", "sk-secret-value");
    let yaml = format!("{BASE_YAML}\nagent_retry_limit: 3\nproject_timeout_secs: 120\nwatcher_debounce_ms: 50\n");
    let file = write_yaml(&yaml);
    let config = Config::load(file.path()).expect("load");
    let loop_config = config.loop_config();
    assert_eq!(loop_config.agent_retry_limit, 3);
    assert_eq!(loop_config.project_timeout, Duration::from_secs(120));
    assert_eq!(loop_config.watcher_debounce, Duration::from_millis(50));
    std::env::remove_var("TEST_TUMBLER_API_KEY");
}

#[test]
#[serial]
fn validate_model_assignments_rejects_unknown_provider() {
    std::env::set_var("TEST_TUMBLER_API_KEY", "sk-secret-value");
    let yaml = BASE_YAML.replace("provider_id: anthropic\n model: claude-test\n verifier:", "provider_id: ghost\n model: claude-test\n verifier:");
    let file = write_yaml(&yaml);
    let config = Config::load(file.path()).expect("load");
    let err = validate_model_assignments(&config).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProviderKind { id, .. } if id == "ghost"));
    std::env::remove_var("TEST_TUMBLER_API_KEY");
}

#[test]
#[serial]
fn build_provider_registry_resolves_anthropic() {
    std::env::set_var("TEST_TUMBLER_API_KEY", "sk-secret-value");
    let file = write_yaml(BASE_YAML);
    let config = Config::load(file.path()).expect("load");
    let registry = config.build_provider_registry().expect("registry");
    assert!(registry.get("anthropic").is_ok());
    std::env::remove_var("TEST_TUMBLER_API_KEY");
}
