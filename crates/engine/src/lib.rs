// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tumbler-engine: the Feedback Loop — the per-project state
//! machine that sequences Architect → Engineer → Verifier across
//! iterations until convergence or budget exhaustion, plus the archiving
//! and timeout machinery around it.
//!
//! The loop itself (`decision`, `context`, `plan`) is pure and unit-tested
//! directly; `runtime` is the async task that drives those pure decisions
//! against the real agent runner, sandbox executor, scorer, state store,
//! and event bus.

pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod plan;
pub mod staging;

mod runtime;

pub use config::{AgentRoleConfig, LoopConfig, ModelConfig};
pub use decision::{decide, Decision};
pub use error::LoopError;
pub use runtime::{LoopCollaborators, LoopHandle, ProjectLoop};
