//! Page-object tests over a fully scripted mock site

use std::sync::Arc;

use crate::config::Config;
use crate::harness::TestContext;
use crate::pages::docs::DocsPage;
use crate::pages::home::HomePage;
use crate::pages::product::ProductPage;
use crate::pages::scenario;
use crate::session::mock::{MockElement, MockSession};
use crate::session::{Session, SessionRegistry, WorkerId};

fn fast_config() -> Config {
    let mut config = Config::default();
    config.element_wait_secs = 1;
    config.poll_interval_ms = 10;
    config.settle_ms = 0;
    config.retry_backoff_ms = 1;
    // A zero time box makes absent-banner probes a single poll
    config.consent.timebox_secs = 0;
    config
}

/// Stub every element the full flow touches
fn scripted_site(config: &Config) -> Arc<MockSession> {
    let session = MockSession::new();
    session.set_title("CloudBees Documentation");

    session.stub(&HomePage::products_menu().locator, MockElement::new());

    let product_link = MockElement::new();
    product_link.navigate_on_click(format!("{}{}", config.base_url, scenario::PRODUCT_PATH));
    session.stub(&HomePage::product_link().locator, product_link);

    session.stub(&HomePage::resources_menu().locator, MockElement::new());
    session.stub(&HomePage::documentation_link().locator, MockElement::new());

    session.stub(&ProductPage::cost_savings_section().locator, MockElement::new());
    let savings = MockElement::new();
    savings.set_text("$2m");
    session.stub(&ProductPage::cost_savings_value().locator, savings);

    session.stub(&ProductPage::use_cases_header().locator, MockElement::new());
    session.stub(&ProductPage::audit_tab().locator, MockElement::new());

    let governance = MockElement::new();
    governance.set_text("Generate single-click audit reports for every release");
    session.stub(&ProductPage::governance_text().locator, governance);

    session.stub(&DocsPage::search_field().locator, MockElement::new());
    session.stub(&DocsPage::active_search_input().locator, MockElement::new());
    session.stub(&DocsPage::pagination().locator, MockElement::new());

    // The documentation link opens a second tab
    session.open_window("docs-tab");

    session
}

fn context_over(session: Arc<MockSession>, config: Config) -> TestContext {
    let registry = SessionRegistry::with_builder(
        config.browser.clone(),
        config.headless,
        Arc::new(move |_, _| {
            let session = Arc::clone(&session);
            Box::pin(async move { Ok(session as Arc<dyn Session>) })
        }),
    );

    TestContext {
        worker: WorkerId(1),
        registry: Arc::new(registry),
        config: Arc::new(config),
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_passes_over_scripted_site() {
    let config = fast_config();
    let session = scripted_site(&config);
    let ctx = context_over(Arc::clone(&session), config);

    scenario::full_flow_case().execute(ctx).await.unwrap();

    // The flow navigated home twice and once via the product link
    assert!(session.navigation_count() >= 2);
    assert!(session
        .current_url()
        .await
        .unwrap()
        .contains("cloudbees.com"));

    // The documentation tab got focused
    assert_eq!(session.focused_window_handle(), "docs-tab");
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_types_search_term_and_submits() {
    let config = fast_config();
    let session = scripted_site(&config);

    let search_input = MockElement::new();
    session.stub(&DocsPage::active_search_input().locator, Arc::clone(&search_input));

    let ctx = context_over(Arc::clone(&session), config);
    scenario::full_flow_case().execute(ctx).await.unwrap();

    let typed = search_input.typed_text();
    assert!(typed.starts_with(scenario::DOC_SEARCH_TERM));
    assert!(typed.ends_with(crate::session::keys::ENTER));
}

#[tokio::test(start_paused = true)]
async fn test_full_flow_fails_on_wrong_savings_figure() {
    let config = fast_config();
    let session = scripted_site(&config);

    let wrong = MockElement::new();
    wrong.set_text("$1m");
    session.stub(&ProductPage::cost_savings_value().locator, wrong);

    let ctx = context_over(session, config);
    let result = scenario::full_flow_case().execute(ctx).await;

    let err = result.unwrap_err();
    assert!(matches!(err, crate::Error::AssertionFailed(_)));
    assert!(err.to_string().contains("$1m"));
}

#[tokio::test(start_paused = true)]
async fn test_product_page_reads_scripted_values() {
    let config = fast_config();
    let session = scripted_site(&config);
    let ctx = context_over(session, config);

    let pages = crate::pages::PageContext::from_test(&ctx).await.unwrap();
    let product = ProductPage::new(&pages);

    assert_eq!(product.cost_savings_value_text().await.unwrap(), "$2m");
    assert!(product
        .governance_text_value()
        .await
        .unwrap()
        .contains(scenario::GOVERNANCE_BLURB));
}

#[tokio::test(start_paused = true)]
async fn test_open_base_url_retries_page_load_timeout() {
    let config = fast_config();
    let session = MockSession::new();
    session.fail_navigations(2);
    let ctx = context_over(Arc::clone(&session), config.clone());

    let pages = crate::pages::PageContext::from_test(&ctx).await.unwrap();
    pages.open_base_url().await.unwrap();

    assert_eq!(session.navigation_count(), 1);
    assert_eq!(session.current_url().await.unwrap(), config.base_url);
}

#[tokio::test(start_paused = true)]
async fn test_open_base_url_gives_up_after_bounded_attempts() {
    let config = fast_config();
    let session = MockSession::new();
    session.fail_navigations(10);
    let ctx = context_over(Arc::clone(&session), config);

    let pages = crate::pages::PageContext::from_test(&ctx).await.unwrap();
    let result = pages.open_base_url().await;

    assert!(matches!(result, Err(crate::Error::Timeout(_))));
    assert_eq!(session.navigation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_switch_to_newest_tab_without_second_tab_is_noop() {
    let config = fast_config();
    let session = MockSession::new();
    let ctx = context_over(Arc::clone(&session), config);

    let pages = crate::pages::PageContext::from_test(&ctx).await.unwrap();
    pages.switch_to_newest_tab().await.unwrap();

    assert_eq!(session.focused_window_handle(), "window-1");
}

#[tokio::test(start_paused = true)]
async fn test_docs_loaded_judged_by_title() {
    let config = fast_config();
    let session = MockSession::new();
    session.set_title("Product Documentation | Example");
    let ctx = context_over(Arc::clone(&session), config);

    let pages = crate::pages::PageContext::from_test(&ctx).await.unwrap();
    let docs = DocsPage::new(&pages);

    assert!(docs.is_loaded().await.unwrap());

    session.set_title("Somewhere else");
    assert!(!docs.is_loaded().await.unwrap());
}
