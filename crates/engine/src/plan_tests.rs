use super::*;

#[test]
fn parses_install_and_test_blocks() {
    let plan = "\
    # Plan

    Some prose.

    Install Commands:
    ```bash
    npm ci
    npm run prepare
    ```

    Test Commands:
    ```bash
    npm test
    ```
    ";
    let strategy = parse_plan_commands(plan);
    assert_eq!(strategy.install_commands, vec!["npm ci", "npm run prepare"]);
    assert_eq!(strategy.test_commands, vec!["npm test"]);
    assert!(strategy.build_commands.is_empty());
    assert!(strategy.run_commands.is_empty());
}

#[test]
fn missing_blocks_leave_fields_empty_for_runtime_defaults() {
    let strategy = parse_plan_commands("# Plan\n\nNo fenced blocks here.");
    assert!(strategy.install_commands.is_empty());
    assert!(strategy.build_commands.is_empty());
    assert!(strategy.test_commands.is_empty());
    assert!(strategy.run_commands.is_empty());
}

#[test]
fn key_matching_is_case_insensitive() {
    let plan = "install commands:\n```sh\npip install -e .\n```\n";
    let strategy = parse_plan_commands(plan);
    assert_eq!(strategy.install_commands, vec!["pip install -e ."]);
}

#[test]
fn blank_lines_inside_a_block_are_dropped() {
    let plan = "Build Commands:\n```bash\ncargo build\n\ncargo build --release\n```\n";
    let strategy = parse_plan_commands(plan);
    assert_eq!(strategy.build_commands, vec!["cargo build", "cargo build --release"]);
}
