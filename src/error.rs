//! Unified error types for Sitewalker

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Sitewalker
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid browser kind or other unusable launch configuration
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// WebDriver wire protocol errors without a more specific class
    #[error("WebDriver error: {0}")]
    Wire(String),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Element not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element reference went stale after a DOM mutation
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Click landed on an overlaying element
    #[error("Element click intercepted: {0}")]
    ClickIntercepted(String),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Script execution failed
    #[error("Script execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// A test assertion did not hold
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new unsupported configuration error
    pub fn unsupported_configuration<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedConfiguration(msg.into())
    }

    /// Create a new wire protocol error
    pub fn wire<S: Into<String>>(msg: S) -> Self {
        Error::Wire(msg.into())
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(msg: S) -> Self {
        Error::ElementNotFound(msg.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(msg: S) -> Self {
        Error::StaleElement(msg.into())
    }

    /// Create a new click intercepted error
    pub fn click_intercepted<S: Into<String>>(msg: S) -> Self {
        Error::ClickIntercepted(msg.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new navigation failed error
    pub fn navigation_failed<S: Into<String>>(msg: S) -> Self {
        Error::NavigationFailed(msg.into())
    }

    /// Create a new script execution failed error
    pub fn script_execution_failed<S: Into<String>>(msg: S) -> Self {
        Error::ScriptExecutionFailed(msg.into())
    }

    /// Create a new assertion failed error
    pub fn assertion_failed<S: Into<String>>(msg: S) -> Self {
        Error::AssertionFailed(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this failure class is a transient interaction failure.
    ///
    /// Transient failures (stale reference, intercepted click, wait timeout)
    /// are eligible for bounded local retry inside the interaction layer.
    /// Everything else propagates immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::StaleElement(_) | Error::ClickIntercepted(_) | Error::Timeout(_)
        )
    }

    /// Short name of the failure class, used when logging retry decisions
    pub fn class_name(&self) -> &'static str {
        match self {
            Error::Io(_) => "Io",
            Error::Http(_) => "Http",
            Error::Serialization(_) => "Serialization",
            Error::UnsupportedConfiguration(_) => "UnsupportedConfiguration",
            Error::Wire(_) => "Wire",
            Error::SessionNotFound(_) => "SessionNotFound",
            Error::ElementNotFound(_) => "ElementNotFound",
            Error::StaleElement(_) => "StaleElement",
            Error::ClickIntercepted(_) => "ClickIntercepted",
            Error::Timeout(_) => "Timeout",
            Error::NavigationFailed(_) => "NavigationFailed",
            Error::ScriptExecutionFailed(_) => "ScriptExecutionFailed",
            Error::AssertionFailed(_) => "AssertionFailed",
            Error::Configuration(_) => "Configuration",
            Error::Internal(_) => "Internal",
        }
    }
}
