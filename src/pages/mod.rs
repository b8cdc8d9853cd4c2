//! Page objects for the marketing site
//!
//! Thin, site-specific composition over the interaction engine: a shared
//! [`PageContext`] holds the session, engine, and consent dismisser, and each
//! page type borrows it and exposes navigation methods returning the next
//! page type. Selectors live here as plain data.
//!
//! Module structure:
//! - `home`: landing page and top navigation
//! - `product`: product detail page
//! - `docs`: documentation portal and search
//! - `scenario`: the end-to-end flow registered with the runner

pub mod home;
pub mod product;
pub mod docs;
pub mod scenario;

#[cfg(test)]
mod tests;

pub use docs::DocsPage;
pub use home::HomePage;
pub use product::ProductPage;
pub use scenario::full_flow_case;

use std::sync::Arc;
use tracing::{info, warn};

use crate::harness::TestContext;
use crate::interact::{with_retries, ConsentDismisser, InteractionEngine};
use crate::session::Session;
use crate::Result;

const NAVIGATION_ATTEMPTS: u32 = 3;

/// Shared context the page objects compose over
pub struct PageContext {
    engine: InteractionEngine,
    consent: ConsentDismisser,
    base_url: String,
}

impl PageContext {
    /// Build the context for a test attempt, binding the worker's session
    pub async fn from_test(ctx: &TestContext) -> Result<Self> {
        Ok(Self {
            engine: ctx.engine().await?,
            consent: ctx.consent(),
            base_url: ctx.config.base_url.clone(),
        })
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        self.engine.session()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn current_url(&self) -> Result<String> {
        self.session().current_url().await
    }

    pub async fn title(&self) -> Result<String> {
        self.session().title().await
    }

    /// Dismiss a consent overlay if one is present; never fails the test
    pub async fn accept_cookies_if_present(&self) {
        self.consent.dismiss_if_present(&self.engine).await;
    }

    /// Navigate to the configured base URL, retrying bounded page-load
    /// timeouts, then handle any consent overlay the landing surfaces
    pub async fn open_base_url(&self) -> Result<()> {
        info!("Navigating to URL: {}", self.base_url);

        let session = self.session();
        with_retries(
            "navigate to base URL",
            NAVIGATION_ATTEMPTS,
            std::time::Duration::from_secs(1),
            || async { session.navigate(&self.base_url).await },
        )
        .await?;

        self.accept_cookies_if_present().await;
        Ok(())
    }

    /// Focus the newest tab if one has opened since the session started
    pub async fn switch_to_newest_tab(&self) -> Result<()> {
        let session = self.session();
        let current = session.current_window().await?;
        let handles = session.window_handles().await?;

        if handles.len() < 2 {
            warn!("No new tab found to switch to.");
            return Ok(());
        }

        if let Some(newest) = handles.iter().rev().find(|h| **h != current) {
            session.switch_to_window(newest).await?;
            info!("Switched to new tab: {}", session.title().await?);
        }

        Ok(())
    }
}
