//! Session factory
//!
//! The only component that launches external processes: one WebDriver server
//! per session, which in turn starts the browser.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::session::remote::RemoteSession;
use crate::session::traits::{BrowserKind, Session};
use crate::webdriver::{DriverServer, HttpWireClient};
use crate::Result;

const DRIVER_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Session factory
#[derive(Debug, Clone)]
pub struct SessionFactory {
    config: Arc<Config>,
}

impl SessionFactory {
    /// Create a new session factory
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Build one browser session for the requested kind and headless flag.
    ///
    /// The kind is validated before anything is launched; an unknown value
    /// fails with `UnsupportedConfiguration` and no process side effects.
    pub async fn create(&self, kind: &str, headless: bool) -> Result<Arc<dyn Session>> {
        let kind: BrowserKind = kind.parse()?;

        info!("Creating {} session (headless: {})", kind, headless);

        let binary = self.driver_binary(kind);
        let server = DriverServer::launch(&binary, DRIVER_READY_TIMEOUT).await?;
        let wire = Arc::new(HttpWireClient::new(server.endpoint())?);

        let session = RemoteSession::open(wire, Some(server), kind, capabilities(kind, headless))
            .await?;
        let session: Arc<dyn Session> = Arc::new(session);

        // Session-wide timeouts; if this fails the session is unusable and
        // must not leak the browser process.
        if let Err(e) = session
            .set_timeouts(self.config.element_wait(), self.config.page_load_timeout())
            .await
        {
            let _ = session.close().await;
            return Err(e);
        }

        // Chrome and Edge maximize through a launch argument; Firefox needs
        // an explicit window command once the session exists.
        if !headless && kind == BrowserKind::Firefox {
            if let Err(e) = session.maximize().await {
                let _ = session.close().await;
                return Err(e);
            }
        }

        Ok(session)
    }

    fn driver_binary(&self, kind: BrowserKind) -> String {
        let configured = match kind {
            BrowserKind::Chrome => self.config.driver.chromedriver_path.as_deref(),
            BrowserKind::Firefox => self.config.driver.geckodriver_path.as_deref(),
            BrowserKind::Edge => self.config.driver.edgedriver_path.as_deref(),
        };
        configured
            .unwrap_or(kind.default_driver_binary())
            .to_string()
    }
}

/// Build W3C new-session capabilities for a browser kind.
///
/// Headless runs get a fixed large window since there is no real window to
/// maximize; GPU and sandboxing are disabled for containerized execution.
fn capabilities(kind: BrowserKind, headless: bool) -> serde_json::Value {
    let options = match kind {
        BrowserKind::Chrome | BrowserKind::Edge => {
            let mut args = vec![
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ];
            if headless {
                args.push("--headless=new".to_string());
                args.push("--window-size=1920,1080".to_string());
            } else {
                args.push("--start-maximized".to_string());
            }
            json!({ "args": args })
        }
        BrowserKind::Firefox => {
            let mut args: Vec<String> = Vec::new();
            if headless {
                args.push("-headless".to_string());
                args.push("-width".to_string());
                args.push("1920".to_string());
                args.push("-height".to_string());
                args.push("1080".to_string());
            }
            json!({ "args": args })
        }
    };

    let options_key = match kind {
        BrowserKind::Chrome => "goog:chromeOptions",
        BrowserKind::Firefox => "moz:firefoxOptions",
        BrowserKind::Edge => "ms:edgeOptions",
    };

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": kind.browser_name(),
                (options_key): options,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn factory() -> SessionFactory {
        SessionFactory::new(Arc::new(Config::default()))
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_kind_before_launching() {
        let result = factory().create("safari", true).await;

        match result {
            Err(Error::UnsupportedConfiguration(msg)) => {
                assert!(msg.contains("safari"));
                assert!(msg.contains("chrome, firefox, edge"));
            }
            other => panic!("expected UnsupportedConfiguration, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_chrome_headless_capabilities() {
        let caps = capabilities(BrowserKind::Chrome, true);
        let always_match = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always_match["browserName"], "chrome");
        let args = always_match["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        let args: Vec<&str> = args.iter().filter_map(|a| a.as_str()).collect();
        assert!(args.contains(&"--headless=new"));
        assert!(args.contains(&"--window-size=1920,1080"));
        assert!(args.contains(&"--disable-gpu"));
        assert!(args.contains(&"--no-sandbox"));
        assert!(!args.contains(&"--start-maximized"));
    }

    #[test]
    fn test_chrome_headed_capabilities() {
        let caps = capabilities(BrowserKind::Chrome, false);
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        let args: Vec<&str> = args.iter().filter_map(|a| a.as_str()).collect();
        assert!(args.contains(&"--start-maximized"));
        assert!(!args.contains(&"--headless=new"));
    }

    #[test]
    fn test_firefox_headless_capabilities() {
        let caps = capabilities(BrowserKind::Firefox, true);
        let always_match = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always_match["browserName"], "firefox");
        let args = always_match["moz:firefoxOptions"]["args"].as_array().unwrap();
        let args: Vec<&str> = args.iter().filter_map(|a| a.as_str()).collect();
        assert!(args.contains(&"-headless"));
        assert!(args.contains(&"-width"));
    }

    #[test]
    fn test_edge_capabilities_use_vendor_key() {
        let caps = capabilities(BrowserKind::Edge, true);
        let always_match = &caps["capabilities"]["alwaysMatch"];

        assert_eq!(always_match["browserName"], "MicrosoftEdge");
        assert!(always_match.get("ms:edgeOptions").is_some());
    }

    #[test]
    fn test_driver_binary_override() {
        let mut config = Config::default();
        config.driver.chromedriver_path = Some("/opt/drivers/chromedriver-121".to_string());
        let factory = SessionFactory::new(Arc::new(config));

        assert_eq!(
            factory.driver_binary(BrowserKind::Chrome),
            "/opt/drivers/chromedriver-121"
        );
        assert_eq!(factory.driver_binary(BrowserKind::Firefox), "geckodriver");
    }
}
