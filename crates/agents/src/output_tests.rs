use super::*;

#[test]
fn architect_output_is_passed_through_verbatim() {
    let output = parse_output(AgentRole::Architect, "# Plan\n\n1. Do the thing");
    assert_eq!(output, AgentOutput::Plan("# Plan\n\n1. Do the thing".to_string()));
}

#[test]
fn verifier_output_is_passed_through_verbatim() {
    let output = parse_output(AgentRole::Verifier, "Overall Score: 8/10");
    assert_eq!(output, AgentOutput::Report("Overall Score: 8/10".to_string()));
}

#[test]
fn engineer_output_parses_a_file_entry_array() {
    let raw = r#"[{"path": "src/main.rs", "content": "fn main() {}"}]"#;
    let output = parse_output(AgentRole::Engineer, raw);
    assert_eq!(output, AgentOutput::Files(vec![FileEntry { path: "src/main.rs".into(), content: "fn main() {}".into() }]));
}

#[test]
fn engineer_output_falls_back_to_empty_on_malformed_json() {
    let output = parse_output(AgentRole::Engineer, "not json at all");
    assert_eq!(output, AgentOutput::Files(Vec::new()));
}

#[test]
fn strips_a_shared_common_root() {
    let entries = vec![
        FileEntry { path: "myapp/src/main.rs".into(), content: "a".into() },
        FileEntry { path: "myapp/src/lib.rs".into(), content: "b".into() },
    ];
    let normalized = normalize_engineer_files(entries);
    let paths: Vec<&str> = normalized.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["src/main.rs", "src/lib.rs"]);
}

#[test]
fn does_not_strip_root_when_a_marker_file_is_present() {
    let entries = vec![
        FileEntry { path: "myapp/Cargo.toml".into(), content: "a".into() },
        FileEntry { path: "myapp/src/main.rs".into(), content: "b".into() },
    ];
    let normalized = normalize_engineer_files(entries);
    let paths: Vec<&str> = normalized.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["myapp/Cargo.toml", "myapp/src/main.rs"]);
}

#[test]
fn does_not_strip_when_roots_differ() {
    let entries = vec![
        FileEntry { path: "a/main.rs".into(), content: "1".into() },
        FileEntry { path: "b/lib.rs".into(), content: "2".into() },
    ];
    let normalized = normalize_engineer_files(entries);
    let paths: Vec<&str> = normalized.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a/main.rs", "b/lib.rs"]);
}

#[test]
fn drops_path_escape_attempts_and_logs_a_warning() {
    let entries = vec![
        FileEntry { path: "../../etc/passwd".into(), content: "evil".into() },
        FileEntry { path: "src/main.rs".into(), content: "fine".into() },
    ];
    let normalized = normalize_engineer_files(entries);
    assert_eq!(normalized, vec![FileEntry { path: "src/main.rs".into(), content: "fine".into() }]);
}

#[test]
fn empty_entry_list_normalizes_to_empty() {
    assert_eq!(normalize_engineer_files(Vec::new()), Vec::new());
}
