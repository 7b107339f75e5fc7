use super::*;
use yare::parameterized;

#[test]
fn converges_when_score_meets_threshold_exactly() {
    assert_eq!(decide(8.0, 8.0, 1, 5, 0.0, 0.0), Decision::Completed);
}

#[test]
fn converges_when_score_exceeds_threshold() {
    assert_eq!(decide(9.5, 8.0, 1, 5, 0.0, 0.0), Decision::Completed);
}

#[test]
fn iteration_cap_beats_cost_cap_when_both_would_fire() {
    // Score check happens first, then iteration cap, then cost cap -- this
    // asserts the ordering, not just that *a* failure results.
    assert_eq!(decide(1.0, 8.0, 5, 5, 100.0, 1.0), Decision::Failed(FailureReasonKind::IterationCap));
}

#[test]
fn cost_cap_fires_once_total_reaches_the_limit() {
    assert_eq!(decide(1.0, 8.0, 1, 5, 1.0, 1.0), Decision::Failed(FailureReasonKind::CostCap));
}

#[test]
fn zero_max_cost_disables_the_budget_cap() {
    assert_eq!(decide(1.0, 8.0, 1, 5, 1_000_000.0, 0.0), Decision::NextIteration);
}

#[test]
fn next_iteration_when_nothing_has_triggered_yet() {
    assert_eq!(decide(3.0, 8.0, 1, 5, 0.0, 0.0), Decision::NextIteration);
}

#[parameterized(
        below_threshold_first_iteration = { 5.0, 8.0, 1, 3, 0.0, 0.0, Decision::NextIteration },
        at_iteration_cap = { 5.0, 8.0, 3, 3, 0.0, 0.0, Decision::Failed(FailureReasonKind::IterationCap) },
        over_iteration_cap_still_reported_as_cap = { 5.0, 8.0, 4, 3, 0.0, 0.0, Decision::Failed(FailureReasonKind::IterationCap) },
)]
fn boundary_table(score: f64, threshold: f64, iteration: u32, max_iterations: u32, total_cost: f64, max_cost: f64, expected: Decision) {
    assert_eq!(decide(score, threshold, iteration, max_iterations, total_cost, max_cost), expected);
}

#[test]
fn failure_reason_kind_formats_iteration_cap() {
    let reason = FailureReasonKind::IterationCap.into_reason(2, 2, 0.0, 0.0);
    match reason {
        tumbler_core::FailureReason::IterationCap { iteration, max_iterations } => {
            assert_eq!(iteration, 2);
            assert_eq!(max_iterations, 2);
        }
        other => panic!("unexpected reason: {other:?}"),
    }
}

#[test]
fn failure_reason_kind_formats_cost_cap() {
    let reason = FailureReasonKind::CostCap.into_reason(1, 5, 0.02, 0.01);
    match reason {
        tumbler_core::FailureReason::CostCap { total_cost, max_cost } => {
            assert!((total_cost - 0.02).abs() < 1e-9);
            assert!((max_cost - 0.01).abs() < 1e-9);
        }
        other => panic!("unexpected reason: {other:?}"),
    }
}
