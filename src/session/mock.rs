//! Mock session implementation for testing
//!
//! Elements are scripted per stub: they can report hidden for the first N
//! visibility checks, fail the first N clicks with a chosen transient class,
//! vanish after a successful click, or move the session to a new URL. Click
//! and check counters let tests assert exact attempt counts.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::session::traits::{BrowserKind, ElementHandle, Locator, Session};
use crate::webdriver::ELEMENT_KEY;
use crate::{Error, Result};

/// Transient failure classes a mock element can be scripted to raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Stale,
    Intercepted,
    Timeout,
}

impl TransientKind {
    fn to_error(self, context: &str) -> Error {
        match self {
            TransientKind::Stale => Error::stale_element(context.to_string()),
            TransientKind::Intercepted => Error::click_intercepted(context.to_string()),
            TransientKind::Timeout => Error::timeout(context.to_string()),
        }
    }
}

/// Scriptable mock element
pub struct MockElement {
    id: String,
    text: Mutex<String>,
    typed: Mutex<String>,
    displayed: AtomicBool,
    enabled: AtomicBool,
    obscured: AtomicBool,
    hidden_for_checks: AtomicU32,
    displayed_checks: AtomicU32,
    click_failures: Mutex<VecDeque<TransientKind>>,
    clicks: AtomicU32,
    vanish_on_click: AtomicBool,
    navigate_on_click: Mutex<Option<String>>,
    url_slot: Mutex<Option<Arc<Mutex<String>>>>,
}

impl MockElement {
    /// Create a new mock element, visible and enabled by default
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            text: Mutex::new(String::new()),
            typed: Mutex::new(String::new()),
            displayed: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
            obscured: AtomicBool::new(false),
            hidden_for_checks: AtomicU32::new(0),
            displayed_checks: AtomicU32::new(0),
            click_failures: Mutex::new(VecDeque::new()),
            clicks: AtomicU32::new(0),
            vanish_on_click: AtomicBool::new(false),
            navigate_on_click: Mutex::new(None),
            url_slot: Mutex::new(None),
        })
    }

    pub fn set_text<S: Into<String>>(&self, text: S) {
        *self.text.lock().expect("text poisoned") = text.into();
    }

    pub fn set_displayed(&self, displayed: bool) {
        self.displayed.store(displayed, Ordering::SeqCst);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_obscured(&self, obscured: bool) {
        self.obscured.store(obscured, Ordering::SeqCst);
    }

    /// Report hidden for the first `checks` visibility probes
    pub fn hide_for_checks(&self, checks: u32) {
        self.hidden_for_checks.store(checks, Ordering::SeqCst);
    }

    /// Fail the next `count` clicks with the given transient class
    pub fn fail_clicks(&self, kind: TransientKind, count: u32) {
        let mut failures = self.click_failures.lock().expect("failures poisoned");
        for _ in 0..count {
            failures.push_back(kind);
        }
    }

    /// Become invisible after a successful click (consent banners)
    pub fn vanish_on_click(&self) {
        self.vanish_on_click.store(true, Ordering::SeqCst);
    }

    /// Move the session to `url` on a successful click
    pub fn navigate_on_click<S: Into<String>>(&self, url: S) {
        *self.navigate_on_click.lock().expect("nav poisoned") = Some(url.into());
    }

    /// Underlying click attempts performed so far, native and script alike
    pub fn click_count(&self) -> u32 {
        self.clicks.load(Ordering::SeqCst)
    }

    /// Visibility probes performed so far
    pub fn displayed_check_count(&self) -> u32 {
        self.displayed_checks.load(Ordering::SeqCst)
    }

    /// Text typed into the element so far
    pub fn typed_text(&self) -> String {
        self.typed.lock().expect("typed poisoned").clone()
    }

    fn attach_url_slot(&self, slot: Arc<Mutex<String>>) {
        *self.url_slot.lock().expect("slot poisoned") = Some(slot);
    }

    fn perform_click(&self, context: &str) -> Result<()> {
        self.clicks.fetch_add(1, Ordering::SeqCst);

        if let Some(kind) = self
            .click_failures
            .lock()
            .expect("failures poisoned")
            .pop_front()
        {
            return Err(kind.to_error(context));
        }

        if self.vanish_on_click.load(Ordering::SeqCst) {
            self.displayed.store(false, Ordering::SeqCst);
        }

        if let Some(url) = self.navigate_on_click.lock().expect("nav poisoned").clone() {
            if let Some(slot) = self.url_slot.lock().expect("slot poisoned").as_ref() {
                *slot.lock().expect("url poisoned") = url;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ElementHandle for MockElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn click(&self) -> Result<()> {
        self.perform_click("mock native click")
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.lock().expect("text poisoned").clone())
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.typed.lock().expect("typed poisoned").push_str(text);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.typed.lock().expect("typed poisoned").clear();
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.displayed_checks.fetch_add(1, Ordering::SeqCst);

        let hidden_left = self.hidden_for_checks.load(Ordering::SeqCst);
        if hidden_left > 0 {
            self.hidden_for_checks.store(hidden_left - 1, Ordering::SeqCst);
            return Ok(false);
        }

        Ok(self.displayed.load(Ordering::SeqCst))
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    fn wire_reference(&self) -> serde_json::Value {
        json!({ ELEMENT_KEY: self.id })
    }
}

impl std::fmt::Debug for MockElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockElement").field("id", &self.id).finish()
    }
}

/// Mock session implementation
#[derive(Debug)]
pub struct MockSession {
    id: String,
    kind: BrowserKind,
    url: Arc<Mutex<String>>,
    title: Mutex<String>,
    stubs: Mutex<HashMap<String, Arc<MockElement>>>,
    by_ref: Mutex<HashMap<String, Arc<MockElement>>>,
    default_stub: Mutex<Option<Arc<MockElement>>>,
    navigation_failures: AtomicU32,
    navigations: AtomicU32,
    screenshots: AtomicU32,
    windows: Mutex<Vec<String>>,
    focused_window: Mutex<String>,
    scripts: Mutex<Vec<String>>,
    timeouts: Mutex<Option<(Duration, Duration)>>,
    is_active: AtomicBool,
}

impl MockSession {
    /// Create a new mock session
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            kind: BrowserKind::Chrome,
            url: Arc::new(Mutex::new("about:blank".to_string())),
            title: Mutex::new("Mock Page".to_string()),
            stubs: Mutex::new(HashMap::new()),
            by_ref: Mutex::new(HashMap::new()),
            default_stub: Mutex::new(None),
            navigation_failures: AtomicU32::new(0),
            navigations: AtomicU32::new(0),
            screenshots: AtomicU32::new(0),
            windows: Mutex::new(vec!["window-1".to_string()]),
            focused_window: Mutex::new("window-1".to_string()),
            scripts: Mutex::new(Vec::new()),
            timeouts: Mutex::new(None),
            is_active: AtomicBool::new(true),
        })
    }

    /// Register an element under a locator
    pub fn stub(&self, locator: &Locator, element: Arc<MockElement>) {
        element.attach_url_slot(Arc::clone(&self.url));
        self.by_ref
            .lock()
            .expect("by_ref poisoned")
            .insert(element.id.clone(), Arc::clone(&element));
        self.stubs
            .lock()
            .expect("stubs poisoned")
            .insert(locator.value().to_string(), element);
    }

    /// Register a fallback element every unmatched locator resolves to
    pub fn stub_default(&self, element: Arc<MockElement>) {
        element.attach_url_slot(Arc::clone(&self.url));
        self.by_ref
            .lock()
            .expect("by_ref poisoned")
            .insert(element.id.clone(), Arc::clone(&element));
        *self.default_stub.lock().expect("default poisoned") = Some(element);
    }

    /// Set the page title subsequent `title` calls report
    pub fn set_title<S: Into<String>>(&self, title: S) {
        *self.title.lock().expect("title poisoned") = title.into();
    }

    /// Fail the next `count` navigations with a page-load timeout
    pub fn fail_navigations(&self, count: u32) {
        self.navigation_failures.store(count, Ordering::SeqCst);
    }

    /// Add an open window, as a popped-up tab would
    pub fn open_window<S: Into<String>>(&self, handle: S) {
        self.windows.lock().expect("windows poisoned").push(handle.into());
    }

    pub fn focused_window_handle(&self) -> String {
        self.focused_window.lock().expect("focused poisoned").clone()
    }

    pub fn navigation_count(&self) -> u32 {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn screenshot_count(&self) -> u32 {
        self.screenshots.load(Ordering::SeqCst)
    }

    /// Scripts executed so far
    pub fn script_log(&self) -> Vec<String> {
        self.scripts.lock().expect("scripts poisoned").clone()
    }

    /// Timeouts applied via `set_timeouts`, if any
    pub fn applied_timeouts(&self) -> Option<(Duration, Duration)> {
        *self.timeouts.lock().expect("timeouts poisoned")
    }

    fn element_from_args(&self, args: &[serde_json::Value]) -> Option<Arc<MockElement>> {
        let id = args.first()?.get(ELEMENT_KEY)?.as_str()?;
        self.by_ref.lock().expect("by_ref poisoned").get(id).cloned()
    }
}

#[async_trait]
impl Session for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BrowserKind {
        self.kind
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let failures = self.navigation_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.navigation_failures.store(failures - 1, Ordering::SeqCst);
            return Err(Error::timeout(format!("page load timed out for {}", url)));
        }

        self.navigations.fetch_add(1, Ordering::SeqCst);
        *self.url.lock().expect("url poisoned") = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.lock().expect("url poisoned").clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.title.lock().expect("title poisoned").clone())
    }

    async fn find(&self, locator: &Locator) -> Result<Arc<dyn ElementHandle>> {
        if let Some(element) = self
            .stubs
            .lock()
            .expect("stubs poisoned")
            .get(locator.value())
        {
            return Ok(Arc::clone(element) as Arc<dyn ElementHandle>);
        }

        if let Some(element) = self.default_stub.lock().expect("default poisoned").as_ref() {
            return Ok(Arc::clone(element) as Arc<dyn ElementHandle>);
        }

        Err(Error::element_not_found(locator.to_string()))
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.scripts
            .lock()
            .expect("scripts poisoned")
            .push(script.to_string());

        if script.contains("elementFromPoint") {
            let unobscured = self
                .element_from_args(&args)
                .map(|el| !el.obscured.load(Ordering::SeqCst))
                .unwrap_or(true);
            return Ok(json!(unobscured));
        }

        if script.contains(".click()") {
            if let Some(element) = self.element_from_args(&args) {
                element.perform_click("mock script click")?;
            }
            return Ok(serde_json::Value::Null);
        }

        // scrollIntoView, window.scrollTo and friends have no observable
        // mock effect beyond the log
        Ok(serde_json::Value::Null)
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        self.screenshots.fetch_add(1, Ordering::SeqCst);
        // Minimal PNG header, enough for a file to be written
        Ok(vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52,
        ])
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        Ok(self.windows.lock().expect("windows poisoned").clone())
    }

    async fn current_window(&self) -> Result<String> {
        Ok(self.focused_window_handle())
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        let windows = self.windows.lock().expect("windows poisoned");
        if !windows.iter().any(|w| w == handle) {
            return Err(Error::session_not_found(format!(
                "no window handle {}",
                handle
            )));
        }
        drop(windows);

        *self.focused_window.lock().expect("focused poisoned") = handle.to_string();
        Ok(())
    }

    async fn maximize(&self) -> Result<()> {
        Ok(())
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> Result<()> {
        *self.timeouts.lock().expect("timeouts poisoned") = Some((implicit, page_load));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.is_active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
