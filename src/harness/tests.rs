//! Runner tests over mock sessions

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::harness::case::{require, TestCase};
use crate::harness::retry::RetryPolicy;
use crate::harness::runner::Runner;
use crate::session::mock::MockSession;
use crate::session::{Session, SessionRegistry};
use crate::Error;

fn test_config() -> Config {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.artifact_dir = dir.keep().to_string_lossy().to_string();
    config.max_test_retries = 2;
    config
}

fn counting_registry() -> (Arc<SessionRegistry>, Arc<AtomicU32>) {
    let created = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&created);

    let registry = SessionRegistry::with_builder(
        "chrome".to_string(),
        true,
        Arc::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(MockSession::new() as Arc<dyn Session>) })
        }),
    );

    (Arc::new(registry), created)
}

#[tokio::test]
async fn test_passing_case_runs_once() {
    let (registry, created) = counting_registry();
    let mut runner = Runner::with_registry(Arc::new(test_config()), registry);

    runner.register(TestCase::new("smoke", |ctx| async move {
        ctx.session().await?;
        Ok(())
    }));

    let report = runner.run().await;

    assert_eq!(report.total, 1);
    assert_eq!(report.passed, 1);
    assert_eq!(report.cases[0].attempts.len(), 1);
    assert!(report.cases[0].passed);
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_flaky_case_passes_on_third_attempt() {
    let (registry, created) = counting_registry();
    let mut runner = Runner::with_registry(Arc::new(test_config()), Arc::clone(&registry));

    let executions = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&executions);
    runner.register(TestCase::new("flaky", move |ctx| {
        let counter = Arc::clone(&counter);
        async move {
            ctx.session().await?;
            let n = counter.fetch_add(1, Ordering::SeqCst);
            require(n >= 2, "still flaky")
        }
    }));

    let report = runner.run().await;
    let case = &report.cases[0];

    // Three executions total: two failed attempts stay failed, the case
    // aggregate reflects the final pass
    assert!(case.passed);
    assert_eq!(case.attempts.len(), 3);
    assert!(!case.attempts[0].passed);
    assert!(!case.attempts[1].passed);
    assert!(case.attempts[2].passed);

    // Every attempt ran on a fresh session and tore it down
    assert_eq!(created.load(Ordering::SeqCst), 3);
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_always_failing_case_stops_after_budget() {
    let (registry, created) = counting_registry();
    let mut runner = Runner::with_registry(Arc::new(test_config()), registry);

    runner.register(TestCase::new("broken", |ctx| async move {
        ctx.session().await?;
        Err(Error::assertion_failed("never holds"))
    }));

    let report = runner.run().await;
    let case = &report.cases[0];

    // max_test_retries = 2 allows three executions, never a fourth
    assert!(!case.passed);
    assert_eq!(case.attempts.len(), 3);
    assert!(case.attempts.iter().all(|a| !a.passed));
    assert_eq!(created.load(Ordering::SeqCst), 3);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_explicit_policy_survives_default_installation() {
    let (registry, _) = counting_registry();
    let mut runner = Runner::with_registry(Arc::new(test_config()), registry);

    runner.register(
        TestCase::new("no-retry", |_ctx| async { Err(Error::assertion_failed("nope")) })
            .with_retry_policy(RetryPolicy::none()),
    );

    let report = runner.run().await;

    assert_eq!(report.cases[0].attempts.len(), 1);
    assert!(!report.cases[0].passed);
}

#[tokio::test]
async fn test_failure_without_session_skips_snapshot() {
    let (registry, created) = counting_registry();
    let mut runner = Runner::with_registry(Arc::new(test_config()), registry);

    // Fails before ever touching a session
    runner.register(
        TestCase::new("early-exit", |_ctx| async {
            Err(Error::configuration("bad input"))
        })
        .with_retry_policy(RetryPolicy::none()),
    );

    let report = runner.run().await;

    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert!(report.cases[0].attempts[0].snapshot.is_none());
}

#[tokio::test]
async fn test_failing_attempt_captures_snapshot() {
    let (registry, _) = counting_registry();
    let config = test_config();
    let artifact_dir = config.artifact_dir.clone();
    let mut runner = Runner::with_registry(Arc::new(config), registry);

    runner.register(
        TestCase::new("capture-me", |ctx| async move {
            ctx.session().await?;
            Err(Error::assertion_failed("look at the page"))
        })
        .with_retry_policy(RetryPolicy::none()),
    );

    let report = runner.run().await;
    let attempt = &report.cases[0].attempts[0];

    let snapshot = attempt.snapshot.as_ref().expect("snapshot recorded");
    assert!(std::path::Path::new(snapshot).exists());
    assert!(snapshot.contains("capture-me"));
    assert!(snapshot.starts_with(&artifact_dir));
}

#[tokio::test]
async fn test_parallel_cases_use_distinct_sessions() {
    let (registry, created) = counting_registry();
    let mut config = test_config();
    config.parallel = true;
    let mut runner = Runner::with_registry(Arc::new(config), Arc::clone(&registry));

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    for name in ["alpha", "beta", "gamma"] {
        let seen = Arc::clone(&seen);
        runner.register(TestCase::new(name, move |ctx| {
            let seen = Arc::clone(&seen);
            async move {
                let session = ctx.session().await?;
                seen.lock().unwrap().push(session.id().to_string());
                Ok(())
            }
        }));
    }

    let report = runner.run().await;

    assert_eq!(report.passed, 3);
    assert_eq!(created.load(Ordering::SeqCst), 3);

    let mut ids = seen.lock().unwrap().clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_suite_report_serializes() {
    let (registry, _) = counting_registry();
    let config = test_config();
    let artifact_dir = config.artifact_dir.clone();
    let mut runner = Runner::with_registry(Arc::new(config), registry);

    runner.register(TestCase::new("ok", |_ctx| async { Ok(()) }));

    let report = runner.run().await;
    let path = report.write_json(std::path::Path::new(&artifact_dir)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["passed"], 1);
    assert_eq!(json["cases"][0]["name"], "ok");
}
