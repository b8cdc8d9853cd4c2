//! Cookie-consent dismissal
//!
//! Best-effort, time-boxed routine that improves the odds that subsequent
//! interactions are not blocked by a consent overlay. It must never fail a
//! test: every failure in here is caught, logged, and discarded.

use std::time::Duration;
use tracing::{info, warn};

use crate::config::ConsentConfig;
use crate::interact::engine::{InteractionEngine, InteractionTarget};
use crate::session::Locator;
use crate::{Error, Result};

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Cookie-consent dismisser
///
/// The matcher set is site-specific and fragile, so it comes from
/// configuration: case-insensitive accept phrases plus one known control id.
#[derive(Debug, Clone)]
pub struct ConsentDismisser {
    phrases: Vec<String>,
    control_id: String,
    timebox: Duration,
}

impl ConsentDismisser {
    /// Create a dismisser from the configured heuristics
    pub fn new(config: &ConsentConfig) -> Self {
        Self {
            phrases: config.accept_phrases.clone(),
            control_id: config.accept_control_id.clone(),
            timebox: Duration::from_secs(config.timebox_secs),
        }
    }

    /// Locator matching any configured accept control
    pub fn accept_locator(&self) -> Locator {
        let mut clauses: Vec<String> = self
            .phrases
            .iter()
            .map(|phrase| {
                format!(
                    "contains(translate(normalize-space(), '{}', '{}'), '{}')",
                    UPPER,
                    LOWER,
                    phrase.to_lowercase()
                )
            })
            .collect();
        clauses.push(format!("@id='{}'", self.control_id));

        Locator::xpath(format!("//button[{}]", clauses.join(" or ")))
    }

    /// Dismiss a consent overlay if one is present.
    ///
    /// Time-boxed to a short duration distinct from the session's default
    /// wait, and swallows every outcome: overlay absent, dismissed, or
    /// dismissal failed all return normally.
    pub async fn dismiss_if_present(&self, engine: &InteractionEngine) {
        let scoped = engine.scoped(self.timebox);
        let target = InteractionTarget::new(self.accept_locator(), "cookie consent accept control");

        match self.try_dismiss(&scoped, &target).await {
            Ok(true) => info!("Cookie consent accepted."),
            Ok(false) => info!(
                "Cookie consent banner not found or already handled within {:?}.",
                self.timebox
            ),
            Err(e) => warn!("An issue occurred while trying to accept cookies: {}", e),
        }
    }

    async fn try_dismiss(
        &self,
        engine: &InteractionEngine,
        target: &InteractionTarget,
    ) -> Result<bool> {
        let element = match engine.wait_displayed(target).await {
            Ok(element) => element,
            Err(Error::Timeout(_)) | Err(Error::ElementNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        if !element.is_displayed().await? {
            return Ok(false);
        }

        info!("Cookie consent banner found. Clicking accept...");
        engine.script_click(target).await?;
        engine.wait_gone(target).await?;

        Ok(true)
    }
}
