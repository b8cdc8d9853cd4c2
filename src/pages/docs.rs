//! Documentation portal and its search flow

use tracing::info;

use crate::interact::InteractionTarget;
use crate::pages::PageContext;
use crate::session::keys;
use crate::Result;

/// Documentation portal page
pub struct DocsPage<'a> {
    ctx: &'a PageContext,
}

impl<'a> DocsPage<'a> {
    pub fn new(ctx: &'a PageContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn search_field() -> InteractionTarget {
        InteractionTarget::xpath(
            "//input[@placeholder='Search all CloudBees Resources']",
            "resource search field",
        )
    }

    pub(crate) fn active_search_input() -> InteractionTarget {
        InteractionTarget::xpath("//input[@placeholder='Search']", "active search input")
    }

    pub(crate) fn pagination() -> InteractionTarget {
        InteractionTarget::css("ul.pagination", "search results pagination")
    }

    /// Whether the portal loaded, judged by URL or title
    pub async fn is_loaded(&self) -> Result<bool> {
        let url = self.ctx.current_url().await?;
        let title = self.ctx.title().await?.to_lowercase();

        let loaded = url.contains("docs.") || title.contains("documentation");
        info!("Documentation page loaded: {}, URL: {}, title: {}", loaded, url, title);
        Ok(loaded)
    }

    /// Focus the resource search field
    pub async fn click_search_field(&self) -> Result<&Self> {
        info!("Clicking in the search field.");
        let engine = self.ctx.engine();

        engine.click_with_retry(&Self::search_field()).await?;
        engine.wait(std::time::Duration::from_secs(1)).await;
        Ok(self)
    }

    /// Whether clicking the field surfaced the search interface
    pub async fn search_interface_active(&self) -> Result<bool> {
        let url = self.ctx.current_url().await?;
        if url.contains("/search") || url.contains("?q=") || url.contains("?query=") {
            info!("Search interface active: URL indicates a search page.");
            return Ok(true);
        }

        let engine = self.ctx.engine();
        match engine.wait_displayed(&Self::active_search_input()).await {
            Ok(_) => {
                info!("Search interface active: search input is visible.");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Submit a search for a term
    pub async fn search_for(&self, term: &str) -> Result<&Self> {
        info!("Searching for term: {}", term);
        let engine = self.ctx.engine();

        // Prefer the dedicated input the search interface surfaces; fall
        // back to the initially clicked field
        let input_target = if engine.wait_displayed(&Self::active_search_input()).await.is_ok() {
            Self::active_search_input()
        } else {
            Self::search_field()
        };

        let input = engine.wait_actionable(&input_target).await?;
        input.clear().await?;
        input.send_keys(&format!("{}{}", term, keys::ENTER)).await?;

        info!("Submitted search for: {}", term);
        self.ctx.accept_cookies_if_present().await;
        engine.wait(std::time::Duration::from_secs(3)).await;
        Ok(self)
    }

    /// Whether pagination controls are visible at the bottom of the results
    pub async fn pagination_visible(&self) -> Result<bool> {
        info!("Verifying pagination presence.");
        let engine = self.ctx.engine();

        engine.scroll_to_bottom().await?;

        match engine.wait_displayed(&Self::pagination()).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
