//! The end-to-end flow through the marketing site
//!
//! Navigates the fixed page sequence and asserts on visible content. Each
//! failed assertion fails the current attempt; the runner decides whether
//! the whole flow is re-executed on a fresh session.

use tracing::info;

use crate::harness::{require, TestCase};
use crate::pages::{DocsPage, HomePage, PageContext, ProductPage};

pub(crate) const PRODUCT_PATH: &str = "/products/cloudbees-cdro";
pub(crate) const COST_SAVINGS_FIGURE: &str = "$2m";
pub(crate) const GOVERNANCE_BLURB: &str = "Generate single-click audit reports";
pub(crate) const DOC_SEARCH_TERM: &str = "Installation";

/// The full site flow as a registrable test case
pub fn full_flow_case() -> TestCase {
    TestCase::new("site_full_flow", |ctx| async move {
        let pages = PageContext::from_test(&ctx).await?;
        let home = HomePage::new(&pages);

        info!("Step 1: Open the site");
        home.open().await?;
        require(
            pages.current_url().await?.contains(&ctx.config.expected_domain),
            "Homepage URL is incorrect.",
        )?;

        info!("Step 2: Navigate to the product page");
        let product: ProductPage = home.open_product_page().await?;
        require(
            pages.current_url().await?.contains(PRODUCT_PATH),
            "Not on the product page.",
        )?;

        info!("Step 3: Verify the cost savings figure");
        let savings = product.cost_savings_value_text().await?;
        require(
            savings.contains(COST_SAVINGS_FIGURE)
                || savings.contains(&COST_SAVINGS_FIGURE.to_uppercase()),
            format!(
                "Cost Savings value is not '{}'. Found: {}",
                COST_SAVINGS_FIGURE, savings
            ),
        )?;

        info!("Step 4: Open the Auditors / Security tab");
        product.open_audit_tab().await?;

        info!("Step 5: Verify the Release Governance text");
        let governance = product.governance_text_value().await?;
        require(
            governance.contains(GOVERNANCE_BLURB),
            format!(
                "Release Governance text mismatch. Expected to contain: '{}', Found: '{}'",
                GOVERNANCE_BLURB, governance
            ),
        )?;

        info!("Step 6: Navigate to the documentation portal from a clean state");
        home.open().await?;
        let docs: DocsPage = home.open_documentation().await?;

        info!("Step 7: Switch to the documentation tab");
        pages.switch_to_newest_tab().await?;
        pages.accept_cookies_if_present().await;
        require(
            docs.is_loaded().await?,
            "Documentation page did not load correctly in the new tab.",
        )?;

        info!("Step 8: Open the search interface");
        docs.click_search_field().await?;
        require(
            docs.search_interface_active().await?,
            "Search interface did not become active after clicking the search field.",
        )?;

        info!("Step 9: Search the documentation");
        docs.search_for(DOC_SEARCH_TERM).await?;

        info!("Step 10: Verify pagination at the bottom of the results");
        require(
            docs.pagination_visible().await?,
            "Pagination was not found on the search results page.",
        )?;

        info!("Full site flow completed successfully.");
        Ok(())
    })
}
