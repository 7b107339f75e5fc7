// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tumbler-sandbox: the Sandbox Executor — runs a generated
//! project's install/build/test/lint phases inside an isolated, ephemeral
//! container reached through a restricted proxy, never the container
//! daemon directly.
//!
//! [`run`] is infallible from the caller's point of view: a proxy that
//! cannot be reached yields [`tumbler_core::SandboxResult::unavailable`]
//! rather than an error, since the Feedback Loop falls back to
//! code-review-only mode in that case instead of aborting.

pub mod proxy;
pub mod tar_builder;

mod executor;

pub use executor::run;
pub use proxy::{ContainerProxy, HttpContainerProxy, ProxyError, ProxyPhaseOutput};
pub use tar_builder::{build_tar, TarBuildError};
