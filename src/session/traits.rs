//! Session abstractions
//!
//! This module defines the abstract interfaces for one browser under the
//! harness's control and for element handles resolved within it.

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::Error;

/// Supported browser kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    /// The full supported enumeration
    pub const ALL: [BrowserKind; 3] = [BrowserKind::Chrome, BrowserKind::Firefox, BrowserKind::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
        }
    }

    /// Browser name as it appears in WebDriver capabilities
    pub fn browser_name(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "MicrosoftEdge",
        }
    }

    /// Default driver server executable for this browser
    pub fn default_driver_binary(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chromedriver",
            BrowserKind::Firefox => "geckodriver",
            BrowserKind::Edge => "msedgedriver",
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" => Ok(BrowserKind::Edge),
            other => Err(Error::unsupported_configuration(format!(
                "Unsupported browser: {}. Supported browsers are: chrome, firefox, edge.",
                other
            ))),
        }
    }
}

/// Element location strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath<S: Into<String>>(expression: S) -> Self {
        Locator::XPath(expression.into())
    }

    /// Location strategy as the wire protocol names it
    pub fn using(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css selector",
            Locator::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::Css(v) => v,
            Locator::XPath(v) => v,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.using(), self.value())
    }
}

/// WebDriver key codepoints used when typing
pub mod keys {
    pub const ENTER: char = '\u{e007}';
}

/// One browser under the harness's control
///
/// Bound to the worker that created it for the lifetime of one test attempt.
/// All operations are strictly sequential from the caller's perspective.
#[async_trait]
pub trait Session: Send + Sync + std::fmt::Debug {
    /// Session id
    fn id(&self) -> &str;

    /// Browser kind this session was created for
    fn kind(&self) -> BrowserKind;

    /// Navigate to a URL and wait for the page load to settle
    async fn navigate(&self, url: &str) -> Result<(), Error>;

    /// URL currently shown in the address bar
    async fn current_url(&self) -> Result<String, Error>;

    /// Current page title
    async fn title(&self) -> Result<String, Error>;

    /// Resolve a locator to an element handle
    async fn find(&self, locator: &Locator) -> Result<Arc<dyn ElementHandle>, Error>;

    /// Execute JavaScript in the page, with element handles as arguments
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, Error>;

    /// Capture a PNG snapshot of the current page
    async fn screenshot_png(&self) -> Result<Vec<u8>, Error>;

    /// All open window handles
    async fn window_handles(&self) -> Result<Vec<String>, Error>;

    /// Handle of the focused window
    async fn current_window(&self) -> Result<String, Error>;

    /// Focus a window by handle
    async fn switch_to_window(&self, handle: &str) -> Result<(), Error>;

    /// Maximize the browser window
    async fn maximize(&self) -> Result<(), Error>;

    /// Apply the session-wide implicit element wait and page load timeout
    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> Result<(), Error>;

    /// Terminate the browser and release all resources
    async fn close(&self) -> Result<(), Error>;

    /// Whether the session is still usable
    fn is_active(&self) -> bool;
}

/// A located element within a session
///
/// Handles are not re-resolved by the session layer; a handle that crossed a
/// DOM mutation will report stale on its next operation and the caller
/// re-resolves from the locator.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Element reference id
    fn id(&self) -> &str;

    /// Perform a native click
    async fn click(&self) -> Result<(), Error>;

    /// Visible text content
    async fn text(&self) -> Result<String, Error>;

    /// Type a sequence of characters into the element
    async fn send_keys(&self, text: &str) -> Result<(), Error>;

    /// Clear editable content
    async fn clear(&self) -> Result<(), Error>;

    /// Whether the element is rendered visible
    async fn is_displayed(&self) -> Result<bool, Error>;

    /// Whether the element accepts interaction
    async fn is_enabled(&self) -> Result<bool, Error>;

    /// Wire-protocol reference for passing the element to scripts
    fn wire_reference(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_kind_parse() {
        assert_eq!("chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("FireFox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert_eq!("EDGE".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
    }

    #[test]
    fn test_browser_kind_parse_unsupported() {
        let err = "safari".parse::<BrowserKind>().unwrap_err();
        match err {
            Error::UnsupportedConfiguration(msg) => {
                assert!(msg.contains("safari"));
                assert!(msg.contains("chrome, firefox, edge"));
            }
            other => panic!("expected UnsupportedConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_locator_wire_strategy() {
        let css = Locator::css("button.submit");
        assert_eq!(css.using(), "css selector");
        assert_eq!(css.value(), "button.submit");

        let xpath = Locator::xpath("//button[@type='submit']");
        assert_eq!(xpath.using(), "xpath");
        assert_eq!(xpath.to_string(), "xpath=//button[@type='submit']");
    }
}
