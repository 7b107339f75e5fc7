use super::*;

#[test]
fn parses_overall_score_line() {
    let report = "The implementation looks solid.\n\nOverall Score: 8.5/10\n";
    assert_eq!(parse_overall_score(report), Some(8.5));
}

#[test]
fn parses_integer_overall_score() {
    assert_eq!(parse_overall_score("Overall Score: 9/10"), Some(9.0));
}

#[test]
fn returns_none_without_an_overall_score_line() {
    assert_eq!(parse_overall_score("Looks good, ship it."), None);
}

#[test]
fn llm_score_wins_over_metric() {
    let report = "Overall Score: 7/10";
    assert_eq!(resolve_score(Some(report), Some(10.0)), 7.0);
}

#[test]
fn metric_used_when_report_has_no_parseable_score() {
    assert_eq!(resolve_score(Some("no verdict stated"), Some(6.2)), 6.2);
}

#[test]
fn defaults_when_neither_is_available() {
    assert_eq!(resolve_score(None, None), DEFAULT_SCORE);
}
