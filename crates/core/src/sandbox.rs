// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared vocabulary between the Sandbox Executor, the Verification Scorer,
//! and the Event Bus.

/// Runtime detected from workspace marker files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runtime {
    Node,
    Python,
    Go,
    Rust,
    Java,
}

impl Runtime {
    /// First-match marker file that identifies this runtime.
    pub fn marker_files(self) -> &'static [&'static str] {
        match self {
            Runtime::Node => &["package.json"],
            Runtime::Python => &["requirements.txt", "pyproject.toml"],
            Runtime::Go => &["go.mod"],
            Runtime::Rust => &["Cargo.toml"],
            Runtime::Java => &["pom.xml"],
        }
    }

    pub fn default_image(self) -> &'static str {
        match self {
            Runtime::Node => "node:20-slim",
            Runtime::Python => "python:3.12-slim",
            Runtime::Go => "golang:1.22-alpine",
            Runtime::Rust => "rust:1.78-slim",
            Runtime::Java => "eclipse-temurin:21-jdk-alpine",
        }
    }

    /// Detect the runtime for a workspace by first-match marker file, in the
    /// table order from the documented contract (Node, Python, Go, Rust, Java).
    pub fn detect(workspace: &std::path::Path) -> Option<Runtime> {
        for runtime in [Runtime::Node, Runtime::Python, Runtime::Go, Runtime::Rust, Runtime::Java] {
            if runtime.marker_files().iter().any(|m| workspace.join(m).is_file()) {
                return Some(runtime);
            }
        }
        None
    }

    /// Runtime default command lists, overridden per-phase by strategy keys
    /// parsed from PLAN.md. Lint always uses these defaults.
    pub fn default_commands(self, phase: SandboxPhase) -> Vec<String> {
        let cmds: &[&str] = match (self, phase) {
            (Runtime::Node, SandboxPhase::Install) => &["npm install"],
            (Runtime::Node, SandboxPhase::Build) => &["npm run build --if-present"],
            (Runtime::Node, SandboxPhase::Test) => &["npm test --if-present"],
            (Runtime::Node, SandboxPhase::Lint) => &["npx eslint . || true"],
            (Runtime::Python, SandboxPhase::Install) => &["pip install -r requirements.txt || pip install ."],
            (Runtime::Python, SandboxPhase::Build) => &["python -m py_compile **/*.py || true"],
            (Runtime::Python, SandboxPhase::Test) => &["pytest"],
            (Runtime::Python, SandboxPhase::Lint) => &["ruff check . || true"],
            (Runtime::Go, SandboxPhase::Install) => &["go mod download"],
            (Runtime::Go, SandboxPhase::Build) => &["go build ./..."],
            (Runtime::Go, SandboxPhase::Test) => &["go test ./..."],
            (Runtime::Go, SandboxPhase::Lint) => &["go vet ./..."],
            (Runtime::Rust, SandboxPhase::Install) => &["cargo fetch"],
            (Runtime::Rust, SandboxPhase::Build) => &["cargo build"],
            (Runtime::Rust, SandboxPhase::Test) => &["cargo test"],
            (Runtime::Rust, SandboxPhase::Lint) => &["cargo clippy --all-targets"],
            (Runtime::Java, SandboxPhase::Install) => &["mvn -q dependency:resolve"],
            (Runtime::Java, SandboxPhase::Build) => &["mvn -q compile"],
            (Runtime::Java, SandboxPhase::Test) => &["mvn -q test"],
            (Runtime::Java, SandboxPhase::Lint) => &["mvn -q checkstyle:check || true"],
        };
        cmds.iter().map(|s| s.to_string()).collect()
    }
}

/// One of the four sandbox phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxPhase {
    Install,
    Build,
    Test,
    Lint,
}

crate::simple_display! {
    SandboxPhase {
        Install => "install",
        Build => "build",
        Test => "test",
        Lint => "lint",
    }
}

impl SandboxPhase {
    /// Default timeout per the documented contract table.
    pub fn default_timeout(self) -> std::time::Duration {
        let secs = match self {
            SandboxPhase::Install => 300,
            SandboxPhase::Build => 300,
            SandboxPhase::Test => 120,
            SandboxPhase::Lint => 60,
        };
        std::time::Duration::from_secs(secs)
    }
}

/// Outcome of a single phase run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Sandbox unreachable; phase never attempted (code-review-only fallback, §4.6).
    Skipped,
    Passed,
    Failed,
    Timeout,
}

crate::simple_display! {
    PhaseStatus {
        Skipped => "skipped",
        Passed => "passed",
        Failed => "failed",
        Timeout => "timeout",
    }
}

/// Result of running one phase.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseResult {
    #[serde(default)]
    pub status: Option<PhaseStatus>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl PhaseResult {
    pub fn skipped() -> Self {
        Self { status: Some(PhaseStatus::Skipped), ..Default::default() }
    }

    pub fn exit_ok(&self) -> bool {
        matches!(self.status, Some(PhaseStatus::Passed)) && self.exit_code == Some(0)
    }
}

/// The full per-phase result bundle returned by one sandbox run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SandboxResult {
    pub install: PhaseResult,
    pub build: PhaseResult,
    pub test: PhaseResult,
    pub lint: PhaseResult,
    /// False when the sandbox proxy was unreachable; triggers code-review-only
    /// mode downstream.
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

impl SandboxResult {
    /// All phases `skipped`, `available = false` — the code-review-only shape
    /// produced when `SandboxUnavailable` is raised.
    pub fn unavailable() -> Self {
        Self {
            install: PhaseResult::skipped(),
            build: PhaseResult::skipped(),
            test: PhaseResult::skipped(),
            lint: PhaseResult::skipped(),
            available: false,
        }
    }

    pub fn phase(&self, phase: SandboxPhase) -> &PhaseResult {
        match phase {
            SandboxPhase::Install => &self.install,
            SandboxPhase::Build => &self.build,
            SandboxPhase::Test => &self.test,
            SandboxPhase::Lint => &self.lint,
        }
    }
}

/// Per-project resource limits applied to every sandbox container.
///
/// Defaults: 1 CPU, 1 GB RAM, 256 PIDs. The source material disagreed on
/// RAM (1 GB vs. 2 GB in different places — the documented contract Open Questions); this
/// implementation picks 1 GB and exposes it as configuration.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceLimits {
    pub cpus: f64,
    pub memory_mb: u64,
    pub max_pids: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self { cpus: 1.0, memory_mb: 1024, max_pids: 256 }
    }
}

/// Command lists per phase, parsed from PLAN.md fenced blocks or defaulted
/// from the detected runtime.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SandboxStrategy {
    #[serde(default)]
    pub install_commands: Vec<String>,
    #[serde(default)]
    pub build_commands: Vec<String>,
    #[serde(default)]
    pub test_commands: Vec<String>,
    #[serde(default)]
    pub run_commands: Vec<String>,
}

impl SandboxStrategy {
    /// Resolve the command list for a phase: explicit strategy commands win;
    /// otherwise fall back to the runtime default. Lint is never overridden
    ///.
    pub fn commands_for(&self, phase: SandboxPhase, runtime: Runtime) -> Vec<String> {
        let explicit = match phase {
            SandboxPhase::Install => &self.install_commands,
            SandboxPhase::Build => &self.build_commands,
            SandboxPhase::Test => &self.test_commands,
            SandboxPhase::Lint => return runtime.default_commands(SandboxPhase::Lint),
        };
        if explicit.is_empty() {
            runtime.default_commands(phase)
        } else {
            explicit.clone()
        }
    }
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
