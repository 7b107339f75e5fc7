use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tumbler_core::SandboxStrategy;

#[derive(Default)]
struct FakeProxy {
    unreachable: bool,
    teardown_calls: AtomicUsize,
    exit_codes: Mutex<std::collections::HashMap<&'static str, i32>>,
    hang: Mutex<std::collections::HashSet<&'static str>>,
}

impl FakeProxy {
    fn with_exit(mut self, phase: &'static str, code: i32) -> Self {
        self.exit_codes.get_mut().unwrap().insert(phase, code);
        self
    }

    fn hanging(self, phase: &'static str) -> Self {
        self.hang.lock().unwrap().insert(phase);
        self
    }
}

#[async_trait::async_trait]
impl ContainerProxy for FakeProxy {
    async fn create_session(
        &self,
        _image: &str,
        _archive: Vec<u8>,
        _resources: ResourceLimits,
    ) -> Result<String, ProxyError> {
        if self.unreachable {
            Err(ProxyError::Status { status: 503, body: "unreachable".into() })
        } else {
            Ok("session-1".to_string())
        }
    }

    async fn run_phase(
        &self,
        _session_id: &str,
        phase: SandboxPhase,
        _commands: &[String],
        _timeout: Duration,
    ) -> Result<ProxyPhaseOutput, ProxyError> {
        let name = phase.to_string();
        if self.hang.lock().unwrap().contains(name.as_str()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let exit_code = *self.exit_codes.lock().unwrap().get(name.as_str()).unwrap_or(&0);
        Ok(ProxyPhaseOutput { stdout: format!("{name} ran"), stderr: String::new(), exit_code })
    }

    async fn teardown(&self, _session_id: &str) {
        self.teardown_calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn rust_workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"x\"").unwrap();
    dir
}

#[tokio::test]
async fn all_phases_pass_on_a_clean_run() {
    let dir = rust_workspace();
    let proxy: Arc<dyn ContainerProxy> = Arc::new(FakeProxy::default());
    let result =
    run(dir.path(), &SandboxStrategy::default(), Runtime::Rust, ResourceLimits::default(), proxy).await;

    assert!(result.available);
    assert_eq!(result.install.status, Some(PhaseStatus::Passed));
    assert_eq!(result.build.status, Some(PhaseStatus::Passed));
    assert_eq!(result.test.status, Some(PhaseStatus::Passed));
    assert_eq!(result.lint.status, Some(PhaseStatus::Passed));
}

#[tokio::test]
async fn unreachable_proxy_yields_unavailable_result() {
    let dir = rust_workspace();
    let proxy: Arc<dyn ContainerProxy> = Arc::new(FakeProxy { unreachable: true, ..Default::default() });
    let result =
    run(dir.path(), &SandboxStrategy::default(), Runtime::Rust, ResourceLimits::default(), proxy).await;

    assert!(!result.available);
    assert_eq!(result.install.status, Some(PhaseStatus::Skipped));
}

#[tokio::test]
async fn build_failure_skips_test_but_lint_still_runs() {
    let dir = rust_workspace();
    let proxy: Arc<dyn ContainerProxy> =
    Arc::new(FakeProxy::default().with_exit("install", 0).with_exit("build", 1));

    let result =
    run(dir.path(), &SandboxStrategy::default(), Runtime::Rust, ResourceLimits::default(), proxy).await;

    assert!(result.available);
    assert_eq!(result.install.status, Some(PhaseStatus::Passed));
    assert_eq!(result.build.status, Some(PhaseStatus::Failed));
    assert_eq!(result.test.status, Some(PhaseStatus::Skipped));
    assert_eq!(result.lint.status, Some(PhaseStatus::Passed));
}

#[tokio::test(start_paused = true)]
async fn phase_exceeding_its_timeout_is_reported_as_timeout() {
    let dir = rust_workspace();
    let proxy: Arc<dyn ContainerProxy> = Arc::new(FakeProxy::default().hanging("install"));

    let result =
    run(dir.path(), &SandboxStrategy::default(), Runtime::Rust, ResourceLimits::default(), proxy).await;

    assert_eq!(result.install.status, Some(PhaseStatus::Timeout));
    assert_eq!(result.build.status, Some(PhaseStatus::Skipped));
}

#[tokio::test]
async fn session_is_torn_down_after_the_run_completes() {
    let dir = rust_workspace();
    let proxy = Arc::new(FakeProxy::default());
    let _ = run(dir.path(), &SandboxStrategy::default(), Runtime::Rust, ResourceLimits::default(), proxy.clone())
    .await;

    // Teardown is spawned, not awaited inline; give it a tick to run.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(proxy.teardown_calls.load(Ordering::SeqCst), 1);
}
