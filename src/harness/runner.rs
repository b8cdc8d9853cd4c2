//! Test runner
//!
//! Executes registered cases with per-case session lifecycle, failure
//! snapshots, and whole-test retries. Before anything runs, a startup step
//! installs the default retry policy on every case that does not declare its
//! own, so the policy applies uniformly without per-case wiring.

use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::harness::case::{TestCase, TestContext};
use crate::harness::diagnostics;
use crate::harness::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::session::{SessionRegistry, WorkerId};
use crate::Result;

/// Outcome of one execution of a case
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub number: u32,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub snapshot: Option<String>,
}

/// Aggregate outcome of a case across its attempts
///
/// `passed` reflects the final attempt; earlier failed attempts keep their
/// own failed records.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    pub attempts: Vec<AttemptReport>,
}

/// Outcome of a whole suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Write the report as JSON into a directory, returning the file path
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join("suite-report.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Suite report written to: {}", path.display());
        Ok(path)
    }
}

/// Test runner
pub struct Runner {
    config: Arc<Config>,
    registry: Arc<SessionRegistry>,
    cases: Vec<TestCase>,
    default_policy: RetryPolicy,
    policies_installed: bool,
    next_worker: AtomicU64,
}

impl Runner {
    /// Create a runner backed by real browser sessions
    pub fn new(config: Arc<Config>) -> Self {
        let registry = Arc::new(SessionRegistry::new(Arc::clone(&config)));
        Self::with_registry(config, registry)
    }

    /// Create a runner over an existing registry (mock sessions in tests)
    pub fn with_registry(config: Arc<Config>, registry: Arc<SessionRegistry>) -> Self {
        let default_policy = RetryPolicy::from_config(&config);
        Self {
            config,
            registry,
            cases: Vec::new(),
            default_policy,
            policies_installed: false,
            next_worker: AtomicU64::new(1),
        }
    }

    /// Register a test case
    pub fn register(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// The registry the runner binds sessions through
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Install the default retry policy on every case lacking an explicit
    /// one. Runs once, before any case executes.
    pub fn install_default_policies(&mut self) {
        if self.policies_installed {
            return;
        }

        for case in &mut self.cases {
            if case.retry_override().is_none() {
                case.set_retry_override(self.default_policy);
            }
        }

        self.policies_installed = true;
    }

    /// Run every registered case and aggregate the outcome
    pub async fn run(&mut self) -> SuiteReport {
        self.install_default_policies();

        let started = Instant::now();
        info!("Running {} test case(s)...", self.cases.len());

        let reports = if self.config.parallel {
            self.run_parallel().await
        } else {
            self.run_sequential().await
        };

        let passed = reports.iter().filter(|r| r.passed).count();
        let failed = reports.len() - passed;
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Suite finished: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteReport {
            total: reports.len(),
            passed,
            failed,
            duration_ms,
            cases: reports,
        }
    }

    async fn run_sequential(&self) -> Vec<CaseReport> {
        let mut reports = Vec::with_capacity(self.cases.len());

        for case in &self.cases {
            let worker = self.allocate_worker();
            reports.push(
                Self::run_case(
                    Arc::clone(&self.config),
                    Arc::clone(&self.registry),
                    case.clone(),
                    worker,
                )
                .await,
            );
        }

        reports
    }

    async fn run_parallel(&self) -> Vec<CaseReport> {
        let handles: Vec<_> = self
            .cases
            .iter()
            .map(|case| {
                let config = Arc::clone(&self.config);
                let registry = Arc::clone(&self.registry);
                let case = case.clone();
                let worker = self.allocate_worker();
                tokio::spawn(async move { Self::run_case(config, registry, case, worker).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (handle, case) in join_all(handles).await.into_iter().zip(&self.cases) {
            match handle {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Test '{}' aborted: {}", case.name(), e);
                    reports.push(CaseReport {
                        name: case.name().to_string(),
                        passed: false,
                        attempts: vec![AttemptReport {
                            number: 1,
                            passed: false,
                            duration_ms: 0,
                            error: Some(format!("aborted: {}", e)),
                            snapshot: None,
                        }],
                    });
                }
            }
        }

        reports
    }

    fn allocate_worker(&self) -> WorkerId {
        WorkerId(self.next_worker.fetch_add(1, Ordering::SeqCst))
    }

    /// Run one case through the retry state machine.
    ///
    /// Every attempt gets the complete lifecycle: session bound on first
    /// access inside the body, failure snapshot while the session still
    /// exists, teardown through `release` on success and failure alike.
    async fn run_case(
        config: Arc<Config>,
        registry: Arc<SessionRegistry>,
        case: TestCase,
        worker: WorkerId,
    ) -> CaseReport {
        let policy = case
            .retry_override()
            .unwrap_or_else(|| RetryPolicy::from_config(&config));

        let mut state = RetryState::initial();
        let mut attempts: Vec<AttemptReport> = Vec::new();

        loop {
            let number = attempts.len() as u32 + 1;
            info!("Starting test '{}' attempt {} on {}", case.name(), number, worker);

            let started = Instant::now();
            let ctx = TestContext {
                worker,
                registry: Arc::clone(&registry),
                config: Arc::clone(&config),
            };
            let outcome = case.execute(ctx).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let mut snapshot = None;
            let error = match &outcome {
                Ok(()) => {
                    info!("Test PASSED: {} ({} ms)", case.name(), duration_ms);
                    None
                }
                Err(e) => {
                    error!("Test FAILED: {} - {}", case.name(), e);
                    // Capture before teardown, while the page still exists;
                    // a body that failed before creating a session has
                    // nothing to capture
                    if let Some(session) = registry.existing(worker) {
                        match diagnostics::capture_failure_snapshot(
                            &session,
                            Path::new(&config.artifact_dir),
                            case.name(),
                            number,
                        )
                        .await
                        {
                            Ok(path) => snapshot = Some(path.display().to_string()),
                            Err(capture_err) => {
                                warn!("Failed to capture failure snapshot: {}", capture_err)
                            }
                        }
                    }
                    Some(e.to_string())
                }
            };

            if let Err(e) = registry.release(worker).await {
                warn!("Session teardown for {} failed: {}", worker, e);
            }

            let passed = outcome.is_ok();
            attempts.push(AttemptReport {
                number,
                passed,
                duration_ms,
                error,
                snapshot,
            });

            let (next, decision) = policy.on_result(state, passed);
            state = next;

            match decision {
                RetryDecision::Stop => break,
                RetryDecision::Rerun => {
                    if let RetryState::Attempting(n) = state {
                        warn!("Retrying test '{}', attempt #{}", case.name(), n);
                    }
                }
            }
        }

        if state == RetryState::FailedFinal {
            error!(
                "Test '{}' failed after {} execution(s).",
                case.name(),
                attempts.len()
            );
        }

        CaseReport {
            name: case.name().to_string(),
            passed: state == RetryState::Passed,
            attempts,
        }
    }
}
