//! Configuration management for Sitewalker

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Harness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the site under test
    pub base_url: String,

    /// Domain expected in the address bar once the site has loaded
    pub expected_domain: String,

    /// Default browser kind (chrome, firefox, edge)
    pub browser: String,

    /// Run browsers without a visible window
    pub headless: bool,

    /// Session-wide implicit element wait in seconds
    pub element_wait_secs: u64,

    /// Session-wide page load timeout in seconds
    pub page_load_timeout_secs: u64,

    /// Poll interval for explicit condition waits in milliseconds
    pub poll_interval_ms: u64,

    /// Settle pause after scrolling an element into view, in milliseconds
    pub settle_ms: u64,

    /// Backoff between interaction retry attempts in milliseconds
    pub retry_backoff_ms: u64,

    /// Bounded attempts for a native click
    pub click_attempts: u32,

    /// Bounded attempts for a script-based click
    pub script_click_attempts: u32,

    /// Whole-test retries beyond the first attempt
    pub max_test_retries: u32,

    /// Run test cases as parallel workers
    pub parallel: bool,

    /// Directory for failure snapshots and the suite report
    pub artifact_dir: String,

    /// Log level
    pub log_level: String,

    /// Cookie-consent dismissal heuristics
    pub consent: ConsentConfig,

    /// WebDriver server binaries
    pub driver: DriverConfig,
}

/// Cookie-consent dismissal settings.
///
/// The accept-control matchers are site-specific heuristics, so they are
/// configuration rather than code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Case-insensitive phrases an accept control may carry
    pub accept_phrases: Vec<String>,

    /// Known element id of the accept control
    pub accept_control_id: String,

    /// Time box for the whole dismissal routine in seconds
    pub timebox_secs: u64,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            accept_phrases: vec![
                "accept cookies".to_string(),
                "accept".to_string(),
                "agree".to_string(),
            ],
            accept_control_id: "onetrust-accept-btn-handler".to_string(),
            timebox_secs: 5,
        }
    }
}

/// Paths to WebDriver server executables, resolved from PATH when unset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub chromedriver_path: Option<String>,
    pub geckodriver_path: Option<String>,
    pub edgedriver_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.cloudbees.com".to_string(),
            expected_domain: "cloudbees.com".to_string(),
            browser: "chrome".to_string(),
            headless: true,
            element_wait_secs: 10,
            page_load_timeout_secs: 60,
            poll_interval_ms: 250,
            settle_ms: 1000,
            retry_backoff_ms: 1000,
            click_attempts: 3,
            script_click_attempts: 2,
            max_test_retries: 2,
            parallel: false,
            artifact_dir: "artifacts".to_string(),
            log_level: "info".to_string(),
            consent: ConsentConfig::default(),
            driver: DriverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(base_url) = env::var("SITEWALKER_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(domain) = env::var("SITEWALKER_EXPECTED_DOMAIN") {
            config.expected_domain = domain;
        }

        if let Ok(browser) = env::var("SITEWALKER_BROWSER") {
            config.browser = browser;
        }

        if let Ok(headless) = env::var("SITEWALKER_HEADLESS") {
            config.headless = headless
                .parse()
                .map_err(|_| Error::configuration("Invalid SITEWALKER_HEADLESS"))?;
        }

        if let Ok(wait) = env::var("SITEWALKER_ELEMENT_WAIT_SECS") {
            config.element_wait_secs = wait
                .parse()
                .map_err(|_| Error::configuration("Invalid SITEWALKER_ELEMENT_WAIT_SECS"))?;
        }

        if let Ok(timeout) = env::var("SITEWALKER_PAGE_LOAD_TIMEOUT_SECS") {
            config.page_load_timeout_secs = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid SITEWALKER_PAGE_LOAD_TIMEOUT_SECS"))?;
        }

        if let Ok(retries) = env::var("SITEWALKER_MAX_TEST_RETRIES") {
            config.max_test_retries = retries
                .parse()
                .map_err(|_| Error::configuration("Invalid SITEWALKER_MAX_TEST_RETRIES"))?;
        }

        if let Ok(parallel) = env::var("SITEWALKER_PARALLEL") {
            config.parallel = parallel
                .parse()
                .map_err(|_| Error::configuration("Invalid SITEWALKER_PARALLEL"))?;
        }

        if let Ok(dir) = env::var("SITEWALKER_ARTIFACT_DIR") {
            config.artifact_dir = dir;
        }

        if let Ok(log_level) = env::var("SITEWALKER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Implicit element wait applied to every new session
    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    /// Page load timeout applied to every new session
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Poll interval for explicit condition waits
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settle pause after a scroll
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Backoff between interaction retry attempts
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Time box for the consent dismissal routine
    pub fn consent_timebox(&self) -> Duration {
        Duration::from_secs(self.consent.timebox_secs)
    }
}
