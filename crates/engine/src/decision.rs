// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The convergence decision (the documented contract "Convergence decision (after each
//! Verifier)"): pure function from a project's current iteration/score/cost
//! position to what the loop does next. Kept free of any I/O so the
//! boundary behaviors in the documented contract can be asserted directly.

use tumbler_core::FailureReason;

/// What the loop does after a Verifier run completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// `score ≥ quality_threshold` — archive staging, phase → completed.
    Completed,
    /// Budget or iteration cap reached without convergence — phase → failed.
    Failed(FailureReasonKind),
    /// Neither converged nor exhausted — run another engineering iteration.
    NextIteration,
}

/// `Decision::Failed` carries just enough to build a [`FailureReason`]; the
/// caller supplies the live numbers since this module only decides, it
/// doesn't format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureReasonKind {
    IterationCap,
    CostCap,
}

impl FailureReasonKind {
    pub fn into_reason(self, iteration: u32, max_iterations: u32, total_cost: f64, max_cost: f64) -> FailureReason {
        match self {
            FailureReasonKind::IterationCap => FailureReason::IterationCap { iteration, max_iterations },
            FailureReasonKind::CostCap => FailureReason::CostCap { total_cost, max_cost },
        }
    }
}

/// Decide the next step per the documented contract's ordered rule:
///
/// ```text
/// if score ≥ quality_threshold: → completed
/// elif iteration ≥ max_iterations: → failed (iteration_cap)
/// elif max_cost>0 ∧ total_cost ≥ max_cost: → failed (cost_cap)
/// else: → next engineering iteration
/// ```
///
/// `score` is `≥` (not `>`) against `quality_threshold`. `max_cost = 0` disables
/// the budget cap entirely.
#[allow(clippy::too_many_arguments)]
pub fn decide(score: f64, quality_threshold: f64, iteration: u32, max_iterations: u32, total_cost: f64, max_cost: f64) -> Decision {
    if score >= quality_threshold {
        Decision::Completed
    } else if iteration >= max_iterations {
        Decision::Failed(FailureReasonKind::IterationCap)
    } else if max_cost > 0.0 && total_cost >= max_cost {
        Decision::Failed(FailureReasonKind::CostCap)
    } else {
        Decision::NextIteration
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
