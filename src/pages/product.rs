//! Product detail page

use tracing::{info, warn};

use crate::interact::InteractionTarget;
use crate::pages::PageContext;
use crate::Result;

const SCROLL_DOWN_SCRIPT: &str = "window.scrollBy(0, 500);";

/// Product detail page
pub struct ProductPage<'a> {
    ctx: &'a PageContext,
}

impl<'a> ProductPage<'a> {
    pub fn new(ctx: &'a PageContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn cost_savings_section() -> InteractionTarget {
        InteractionTarget::xpath("//p[normalize-space()='Cost Savings']", "Cost Savings section")
    }

    pub(crate) fn cost_savings_value() -> InteractionTarget {
        InteractionTarget::xpath("//span[normalize-space()='$2m']", "Cost Savings value")
    }

    pub(crate) fn use_cases_header() -> InteractionTarget {
        InteractionTarget::xpath("//h2[contains(text(), 'Key Use Cases')]", "Key Use Cases header")
    }

    pub(crate) fn audit_tab() -> InteractionTarget {
        InteractionTarget::xpath(
            "//button[normalize-space()='Auditors / Security' or normalize-space()='Auditors']",
            "'Auditors / Security' tab",
        )
    }

    pub(crate) fn governance_text() -> InteractionTarget {
        InteractionTarget::xpath(
            "//*[contains(text(), 'Generate single-click audit reports')]",
            "Release Governance text",
        )
    }

    /// Read the headline cost-savings figure
    pub async fn cost_savings_value_text(&self) -> Result<String> {
        info!("Reading the cost savings value");
        let engine = self.ctx.engine();

        engine.scroll_into_view(&Self::cost_savings_section()).await?;
        let value = engine.visible_text(&Self::cost_savings_value()).await?;

        info!("Found cost savings value: {}", value);
        Ok(value)
    }

    /// Open the auditors/security use-case tab
    pub async fn open_audit_tab(&self) -> Result<&Self> {
        info!("Opening the 'Auditors / Security' tab");
        let engine = self.ctx.engine();

        if engine.scroll_into_view(&Self::use_cases_header()).await.is_err() {
            warn!("Key Use Cases header not found, scrolling towards the tab directly.");
            engine.session().execute_script(SCROLL_DOWN_SCRIPT, vec![]).await?;
            engine.wait(std::time::Duration::from_secs(1)).await;
        }

        engine.click_with_retry(&Self::audit_tab()).await?;
        self.ctx.accept_cookies_if_present().await;
        Ok(self)
    }

    /// Read the release-governance blurb shown by the active tab
    pub async fn governance_text_value(&self) -> Result<String> {
        let engine = self.ctx.engine();

        engine.scroll_into_view(&Self::governance_text()).await?;
        let text = engine.visible_text(&Self::governance_text()).await?;

        info!("Found Release Governance text: {}", text);
        Ok(text.trim().to_string())
    }
}
