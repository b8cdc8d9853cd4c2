//! Landing page and top navigation

use tracing::info;

use crate::interact::InteractionTarget;
use crate::pages::docs::DocsPage;
use crate::pages::product::ProductPage;
use crate::pages::PageContext;
use crate::Result;

/// Landing page
pub struct HomePage<'a> {
    ctx: &'a PageContext,
}

impl<'a> HomePage<'a> {
    pub fn new(ctx: &'a PageContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn products_menu() -> InteractionTarget {
        InteractionTarget::xpath("//button[contains(text(),'Products')]", "'Products' menu")
    }

    pub(crate) fn product_link() -> InteractionTarget {
        InteractionTarget::xpath(
            "//a[contains(@href, '/products/cloudbees-cdro') and contains(text(), 'CloudBees CD/RO')]",
            "CloudBees CD/RO link",
        )
    }

    pub(crate) fn resources_menu() -> InteractionTarget {
        InteractionTarget::xpath("//button[contains(text(),'Resources')]", "'Resources' menu")
    }

    pub(crate) fn documentation_link() -> InteractionTarget {
        InteractionTarget::xpath(
            "//a[@id='subcategory-item-0__Documentation']",
            "Documentation link",
        )
    }

    /// Open the landing page
    pub async fn open(&self) -> Result<&Self> {
        self.ctx.open_base_url().await?;
        Ok(self)
    }

    /// Open the product page through the Products menu
    pub async fn open_product_page(&self) -> Result<ProductPage<'a>> {
        info!("Navigating to the product page");
        let engine = self.ctx.engine();

        engine.wait_displayed(&Self::products_menu()).await?;
        engine.click_with_retry(&Self::products_menu()).await?;

        engine.wait_displayed(&Self::product_link()).await?;
        engine.click_with_retry(&Self::product_link()).await?;

        self.ctx.accept_cookies_if_present().await;
        Ok(ProductPage::new(self.ctx))
    }

    /// Open the documentation portal through the Resources menu.
    ///
    /// The menu sits under animating dropdowns that reliably intercept
    /// native clicks, so both steps click through script execution.
    pub async fn open_documentation(&self) -> Result<DocsPage<'a>> {
        info!("Navigating to the documentation portal");
        let engine = self.ctx.engine();

        engine.script_click(&Self::resources_menu()).await?;
        engine.wait(std::time::Duration::from_secs(1)).await;

        if engine.wait_displayed(&Self::documentation_link()).await.is_err() {
            info!("Documentation link visibility wait expired; attempting the click anyway");
        }
        engine.script_click(&Self::documentation_link()).await?;

        // The portal opens in a new tab; tab switching is the caller's call
        Ok(DocsPage::new(self.ctx))
    }
}
