//! Session layer tests: registry ownership and the remote session over a
//! mock wire transport

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::session::mock::MockSession;
use crate::session::registry::{SessionRegistry, WorkerId};
use crate::session::remote::RemoteSession;
use crate::session::traits::{BrowserKind, Locator, Session};
use crate::webdriver::{MockWireClient, WireMethod};
use crate::{Error, Result};

fn counting_registry() -> (SessionRegistry, Arc<AtomicU32>) {
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

    (registry, created)
}

#[tokio::test]
async fn test_current_creates_lazily_and_reuses() {
    let (registry, created) = counting_registry();
    let worker = WorkerId(1);

    assert_eq!(registry.active_count(), 0);

    let first = registry.current(worker).await.unwrap();
    let second = registry.current(worker).await.unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(registry.active_count(), 1);
}

#[tokio::test]
async fn test_workers_get_distinct_sessions() {
    let (registry, _) = counting_registry();

    let a = registry.current(WorkerId(1)).await.unwrap();
    let b = registry.current(WorkerId(2)).await.unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(registry.active_count(), 2);
}

#[tokio::test]
async fn test_release_does_not_affect_other_workers() {
    let (registry, _) = counting_registry();

    let a = registry.current(WorkerId(1)).await.unwrap();
    let b = registry.current(WorkerId(2)).await.unwrap();

    registry.release(WorkerId(1)).await.unwrap();

    assert!(!a.is_active());
    assert!(b.is_active());
    assert_eq!(registry.active_count(), 1);

    // The released worker gets a brand-new session on its next access
    let a2 = registry.current(WorkerId(1)).await.unwrap();
    assert_ne!(a2.id(), a.id());
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let (registry, _) = counting_registry();
    let worker = WorkerId(7);

    registry.current(worker).await.unwrap();
    registry.release(worker).await.unwrap();
    registry.release(worker).await.unwrap();
    registry.release(worker).await.unwrap();

    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_browser_override_applies_on_next_creation() {
    let requested: Arc<std::sync::Mutex<Vec<String>>> = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = Arc::clone(&requested);

    let registry = SessionRegistry::with_builder(
        "chrome".to_string(),
        true,
        Arc::new(move |kind, _| {
            log.lock().unwrap().push(kind);
            Box::pin(async { Ok(MockSession::new() as Arc<dyn Session>) })
        }),
    );

    registry.set_override(WorkerId(1), "firefox").unwrap();
    registry.current(WorkerId(1)).await.unwrap();
    registry.current(WorkerId(2)).await.unwrap();

    let kinds = requested.lock().unwrap().clone();
    assert_eq!(kinds, vec!["firefox".to_string(), "chrome".to_string()]);
}

#[tokio::test]
async fn test_builder_failure_propagates_and_leaves_no_binding() {
    let registry = SessionRegistry::with_builder(
        "chrome".to_string(),
        true,
        Arc::new(|_, _| {
            Box::pin(async {
                Err::<Arc<dyn Session>, Error>(Error::configuration("driver missing"))
            })
        }),
    );

    let result = registry.current(WorkerId(1)).await;
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_concurrent_workers_each_get_a_session() {
    let (registry, created) = counting_registry();
    let registry = Arc::new(registry);

    let mut handles = Vec::new();
    for i in 0..10 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.current(WorkerId(i)).await.map(|s| s.id().to_string())
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);
    assert_eq!(created.load(Ordering::SeqCst), 10);
}

async fn remote_over_mock_wire() -> (RemoteSession, Arc<MockWireClient>) {
    let wire = Arc::new(MockWireClient::new());
    let session = RemoteSession::open(
        Arc::clone(&wire) as Arc<dyn crate::webdriver::WireClient>,
        None,
        BrowserKind::Chrome,
        serde_json::json!({ "capabilities": { "alwaysMatch": { "browserName": "chrome" } } }),
    )
    .await
    .unwrap();
    (session, wire)
}

#[tokio::test]
async fn test_remote_session_opens_with_id() {
    let (session, _) = remote_over_mock_wire().await;
    assert!(!session.id().is_empty());
    assert_eq!(session.kind(), BrowserKind::Chrome);
    assert!(session.is_active());
}

#[tokio::test]
async fn test_remote_session_navigation_round_trip() {
    let (session, _) = remote_over_mock_wire().await;

    session.navigate("https://example.com").await.unwrap();
    assert_eq!(session.current_url().await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_remote_session_applies_timeouts() -> Result<()> {
    let (session, wire) = remote_over_mock_wire().await;

    session
        .set_timeouts(Duration::from_secs(10), Duration::from_secs(60))
        .await?;

    assert_eq!(wire.count_calls_to("/timeouts"), 1);
    Ok(())
}

#[tokio::test]
async fn test_remote_session_find_and_click() {
    let (session, wire) = remote_over_mock_wire().await;

    let element = session.find(&Locator::css("#main")).await.unwrap();
    element.click().await.unwrap();
    element.click().await.unwrap();

    assert_eq!(wire.count_calls_to("/element"), 1);
    assert_eq!(wire.count_calls_to("/click"), 2);
}

#[tokio::test]
async fn test_remote_session_screenshot_decodes() {
    let (session, _) = remote_over_mock_wire().await;

    let png = session.screenshot_png().await.unwrap();
    // PNG magic
    assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_remote_session_close_deletes_once() {
    let (session, wire) = remote_over_mock_wire().await;

    session.close().await.unwrap();
    session.close().await.unwrap();
    assert!(!session.is_active());

    let deletes = wire
        .calls()
        .iter()
        .filter(|(method, _)| *method == WireMethod::Delete)
        .count();
    assert_eq!(deletes, 1);
}
