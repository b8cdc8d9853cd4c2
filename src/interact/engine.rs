//! Interaction engine
//!
//! Click, scroll and wait primitives over one session. Every primitive is
//! handed its target fresh per call and re-resolves the locator on every
//! retry attempt, so a reference that went stale across a DOM mutation never
//! survives into the next attempt.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::interact::retry::with_retries;
use crate::session::{ElementHandle, Locator, Session};
use crate::{Error, Result};

const SCROLL_INTO_VIEW_SCRIPT: &str =
    "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});";

const SCRIPT_CLICK_SCRIPT: &str = "arguments[0].click();";

const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

// Whether the element itself would receive a click at its center point, or
// an overlay is sitting on top of it.
const CENTER_HIT_TEST_SCRIPT: &str = "\
    const el = arguments[0];\
    const rect = el.getBoundingClientRect();\
    const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);\
    return hit === el || el.contains(hit);";

/// A located UI element plus a description used for logging and diagnostics
#[derive(Debug, Clone)]
pub struct InteractionTarget {
    pub locator: Locator,
    pub description: String,
}

impl InteractionTarget {
    pub fn new<S: Into<String>>(locator: Locator, description: S) -> Self {
        Self {
            locator,
            description: description.into(),
        }
    }

    pub fn css<S: Into<String>, D: Into<String>>(selector: S, description: D) -> Self {
        Self::new(Locator::css(selector), description)
    }

    pub fn xpath<S: Into<String>, D: Into<String>>(expression: S, description: D) -> Self {
        Self::new(Locator::xpath(expression), description)
    }
}

impl std::fmt::Display for InteractionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// Timing and attempt budgets for the interaction primitives
#[derive(Debug, Clone)]
pub struct WaitSettings {
    /// Deadline for explicit condition waits
    pub element_wait: Duration,
    /// Interval between condition polls
    pub poll_interval: Duration,
    /// Settle pause after scrolling, for lazy-loaded content and sticky headers
    pub settle: Duration,
    /// Pause between retry attempts
    pub retry_backoff: Duration,
    /// Attempt budget for a native click
    pub click_attempts: u32,
    /// Attempt budget for a script click
    pub script_click_attempts: u32,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            settle: Duration::from_secs(1),
            retry_backoff: Duration::from_secs(1),
            click_attempts: 3,
            script_click_attempts: 2,
        }
    }
}

impl WaitSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            element_wait: config.element_wait(),
            poll_interval: config.poll_interval(),
            settle: config.settle(),
            retry_backoff: config.retry_backoff(),
            click_attempts: config.click_attempts,
            script_click_attempts: config.script_click_attempts,
        }
    }
}

/// Interaction engine
///
/// Stateless per call; holds only the session handle and the timing budgets.
pub struct InteractionEngine {
    session: Arc<dyn Session>,
    waits: WaitSettings,
}

impl InteractionEngine {
    /// Create a new interaction engine over a session
    pub fn new(session: Arc<dyn Session>, waits: WaitSettings) -> Self {
        Self { session, waits }
    }

    /// The session this engine operates on
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Same session, but explicit waits bounded by `element_wait` instead
    /// of the session default
    pub fn scoped(&self, element_wait: Duration) -> Self {
        Self {
            session: Arc::clone(&self.session),
            waits: WaitSettings {
                element_wait,
                ..self.waits.clone()
            },
        }
    }

    /// Scroll the target to the vertical center of the viewport, then pause
    /// a fixed settle interval. No retry: a scroll cannot meaningfully fail
    /// once the target resolves.
    #[instrument(skip(self, target), fields(target = %target))]
    pub async fn scroll_into_view(&self, target: &InteractionTarget) -> Result<()> {
        let element = self.resolve(target).await?;
        self.session
            .execute_script(SCROLL_INTO_VIEW_SCRIPT, vec![element.wire_reference()])
            .await?;
        self.wait(self.waits.settle).await;
        Ok(())
    }

    /// Scroll to the bottom of the page, then pause the settle interval
    #[instrument(skip(self))]
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.session
            .execute_script(SCROLL_TO_BOTTOM_SCRIPT, vec![])
            .await?;
        self.wait(self.waits.settle).await;
        Ok(())
    }

    /// Native click with bounded retry.
    ///
    /// Each attempt runs the full sequence: scroll into view, wait until the
    /// target is actionable, click. Transient failures back off and retry;
    /// exhaustion re-raises the last error, which is fatal to the current
    /// test attempt.
    #[instrument(skip(self, target), fields(target = %target))]
    pub async fn click_with_retry(&self, target: &InteractionTarget) -> Result<()> {
        with_retries(
            &format!("click '{}'", target.description),
            self.waits.click_attempts,
            self.waits.retry_backoff,
            || async {
                self.scroll_into_view(target).await?;
                let element = self.wait_actionable(target).await?;
                element.click().await
            },
        )
        .await
    }

    /// Script-based click with bounded retry, for controls whose native
    /// click is reliably intercepted by overlays that scrolling and waiting
    /// cannot clear. Waits only for visibility, not full actionability.
    #[instrument(skip(self, target), fields(target = %target))]
    pub async fn script_click(&self, target: &InteractionTarget) -> Result<()> {
        with_retries(
            &format!("script-click '{}'", target.description),
            self.waits.script_click_attempts,
            self.waits.retry_backoff,
            || async {
                let element = self.wait_displayed(target).await?;
                self.session
                    .execute_script(SCRIPT_CLICK_SCRIPT, vec![element.wire_reference()])
                    .await?;
                Ok(())
            },
        )
        .await
    }

    /// Blocking pause. Last-resort settle delay only; explicit condition
    /// waits are preferred wherever the UI exposes an observable condition.
    pub async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Wait until the target resolves and reports displayed
    pub async fn wait_displayed(&self, target: &InteractionTarget) -> Result<Arc<dyn ElementHandle>> {
        self.wait_for_condition(target, false).await
    }

    /// Wait until the target is displayed, enabled, and not obscured at its
    /// center point
    pub async fn wait_actionable(
        &self,
        target: &InteractionTarget,
    ) -> Result<Arc<dyn ElementHandle>> {
        self.wait_for_condition(target, true).await
    }

    /// Wait until the target no longer resolves or is no longer displayed
    pub async fn wait_gone(&self, target: &InteractionTarget) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.waits.element_wait;

        loop {
            match self.resolve(target).await {
                Err(_) => return Ok(()),
                Ok(element) => match element.is_displayed().await {
                    Ok(false) | Err(_) => return Ok(()),
                    Ok(true) => {}
                },
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::timeout(format!(
                    "'{}' still visible after {:?}",
                    target.description, self.waits.element_wait
                )));
            }

            tokio::time::sleep(self.waits.poll_interval).await;
        }
    }

    /// Resolve the target's locator to a fresh element handle
    pub async fn resolve(&self, target: &InteractionTarget) -> Result<Arc<dyn ElementHandle>> {
        self.session.find(&target.locator).await
    }

    /// Fetch the target's visible text once it is displayed
    pub async fn visible_text(&self, target: &InteractionTarget) -> Result<String> {
        let element = self.wait_displayed(target).await?;
        element.text().await
    }

    async fn wait_for_condition(
        &self,
        target: &InteractionTarget,
        require_actionable: bool,
    ) -> Result<Arc<dyn ElementHandle>> {
        let deadline = tokio::time::Instant::now() + self.waits.element_wait;

        loop {
            match self.probe(target, require_actionable).await {
                Ok(Some(element)) => return Ok(element),
                Ok(None) => {}
                // A probe failure here is a not-yet, not a verdict; the
                // deadline turns persistent absence into a timeout.
                Err(e) => debug!("Probe of '{}' failed: {}", target.description, e),
            }

            if tokio::time::Instant::now() >= deadline {
                let condition = if require_actionable {
                    "actionable"
                } else {
                    "visible"
                };
                return Err(Error::timeout(format!(
                    "'{}' not {} within {:?}",
                    target.description, condition, self.waits.element_wait
                )));
            }

            tokio::time::sleep(self.waits.poll_interval).await;
        }
    }

    async fn probe(
        &self,
        target: &InteractionTarget,
        require_actionable: bool,
    ) -> Result<Option<Arc<dyn ElementHandle>>> {
        let element = self.resolve(target).await?;

        if !element.is_displayed().await? {
            return Ok(None);
        }

        if require_actionable {
            if !element.is_enabled().await? {
                return Ok(None);
            }

            let unobscured = self
                .session
                .execute_script(CENTER_HIT_TEST_SCRIPT, vec![element.wire_reference()])
                .await?;
            if !unobscured.as_bool().unwrap_or(false) {
                return Ok(None);
            }
        }

        Ok(Some(element))
    }
}
