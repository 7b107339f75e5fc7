use super::*;

#[test]
fn parses_pytest_summary_with_failures() {
    let output = "===== 7 passed, 2 failed in 1.04s =====";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 7);
    assert_eq!(counts.total, 9);
}

#[test]
fn parses_pytest_summary_all_passed() {
    let output = "===== 12 passed in 0.30s =====";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 12);
    assert_eq!(counts.total, 12);
}

#[test]
fn parses_jest_tests_line() {
    let output = "Test Suites: 1 failed, 4 passed, 5 total\nTests: 1 failed, 9 passed, 10 total\n";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 9);
    assert_eq!(counts.total, 10);
}

#[test]
fn parses_vitest_tests_line_no_failures() {
    let output = "Tests: 10 passed, 10 total\n";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 10);
    assert_eq!(counts.total, 10);
}

#[test]
fn parses_go_test_verbose_output() {
    let output = "--- PASS: TestFoo (0.00s)\n--- FAIL: TestBar (0.00s)\n--- PASS: TestBaz (0.00s)\nFAIL\tpkg\t0.01s\n";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 2);
    assert_eq!(counts.total, 3);
}

#[test]
fn parses_generic_fraction_pattern() {
    let output = "42/50 passed";
    let counts = test_counts(output).unwrap();
    assert_eq!(counts.passed, 42);
    assert_eq!(counts.total, 50);
}

#[test]
fn returns_none_for_unrecognized_output() {
    assert!(test_counts("no test runner ran here").is_none());
}

#[test]
fn counts_lint_locations_by_file_line_col() {
    let output = "src/main.rs:10:5: unused variable\nsrc/lib.rs:22:1: missing docs\n";
    assert_eq!(lint_issue_count(output), 2);
}

#[test]
fn prefers_explicit_problems_summary_over_location_count() {
    let output = "src/main.rs:10:5: unused variable\n\n3 problems (3 errors, 0 warnings)\n";
    assert_eq!(lint_issue_count(output), 3);
}

#[test]
fn zero_issues_when_output_is_clean() {
    assert_eq!(lint_issue_count("no issues found\n"), 0);
}
