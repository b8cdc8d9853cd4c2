//! WebDriver wire transport trait
//!
//! Abstracts the HTTP round trip so session code can run against the real
//! protocol or a scripted mock.

use async_trait::async_trait;

use crate::Result;

/// HTTP method of a wire command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMethod {
    Get,
    Post,
    Delete,
}

impl WireMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireMethod::Get => "GET",
            WireMethod::Post => "POST",
            WireMethod::Delete => "DELETE",
        }
    }
}

/// Wire transport to one WebDriver server
///
/// `send` issues a single command and returns the unwrapped `value` field of
/// the W3C response envelope. Protocol-level errors are mapped to crate
/// errors before they reach the caller.
#[async_trait]
pub trait WireClient: Send + Sync + std::fmt::Debug {
    /// Issue a wire command against a path under the server root
    /// (e.g. `/session/{id}/element`)
    async fn send(
        &self,
        method: WireMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value>;

    /// Server root this client talks to
    fn endpoint(&self) -> &str;
}
