//! Sitewalker suite entry point
//!
//! Loads configuration, registers the end-to-end flow, and runs it through
//! the retrying harness. Exits non-zero when the suite has failures so CI
//! can gate on the run.
//!
//! Environment variables:
//! - `SITEWALKER_CONFIG`: path to a TOML configuration file
//! - `SITEWALKER_*`: individual overrides (base URL, browser, headless, ...)
//! - `RUST_LOG`: log filter, overriding the configured log level

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sitewalker::config::Config;
use sitewalker::harness::Runner;
use sitewalker::pages;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the configured level can apply
    let config = match std::env::var("SITEWALKER_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env()?,
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Sitewalker v{}", sitewalker::VERSION);
    info!(
        "Configuration loaded: base_url={}, browser={}, headless={}",
        config.base_url, config.browser, config.headless
    );

    let config = Arc::new(config);
    let mut runner = Runner::new(Arc::clone(&config));

    runner.register(pages::full_flow_case());

    // Install the uniform retry default before anything executes
    runner.install_default_policies();

    let report = runner.run().await;

    if let Err(e) = report.write_json(Path::new(&config.artifact_dir)) {
        error!("Failed to write suite report: {}", e);
    }

    if report.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
