//! Mock wire transport for testing
//!
//! Answers the endpoints the session layer uses with canned values and keeps
//! a call log so tests can assert on the commands that went over the wire.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::traits::{WireClient, WireMethod};
use super::types::ELEMENT_KEY;
use crate::{Error, Result};

// 1x1 transparent PNG
const MOCK_SCREENSHOT_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Mock wire transport
#[derive(Debug, Default)]
pub struct MockWireClient {
    calls: Mutex<Vec<(WireMethod, String)>>,
    url: Mutex<Option<String>>,
    closed: AtomicBool,
}

impl MockWireClient {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent so far, as (method, path) pairs
    pub fn calls(&self) -> Vec<(WireMethod, String)> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of commands whose path ends with the given suffix
    pub fn count_calls_to(&self, path_suffix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(_, path)| path.ends_with(path_suffix))
            .count()
    }
}

#[async_trait]
impl WireClient for MockWireClient {
    async fn send(
        &self,
        method: WireMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(Error::session_not_found("mock transport closed"));
        }

        self.calls
            .lock()
            .expect("call log poisoned")
            .push((method, path.to_string()));

        if method == WireMethod::Delete {
            self.closed.store(true, Ordering::Relaxed);
            return Ok(serde_json::Value::Null);
        }

        // Canned responses keyed by the path shape
        if path == "/session" {
            return Ok(serde_json::json!({
                "sessionId": uuid::Uuid::new_v4().to_string(),
                "capabilities": { "browserName": "chrome" },
            }));
        }

        if path.ends_with("/url") {
            return match method {
                WireMethod::Post => {
                    let url = body
                        .as_ref()
                        .and_then(|b| b.get("url"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("about:blank")
                        .to_string();
                    *self.url.lock().expect("url poisoned") = Some(url);
                    Ok(serde_json::Value::Null)
                }
                _ => Ok(serde_json::json!(self
                    .url
                    .lock()
                    .expect("url poisoned")
                    .clone()
                    .unwrap_or_default())),
            };
        }

        if path.ends_with("/title") {
            return Ok(serde_json::json!("Mock Page"));
        }

        if path.ends_with("/element") {
            return Ok(serde_json::json!({ ELEMENT_KEY: uuid::Uuid::new_v4().to_string() }));
        }

        if path.ends_with("/text") {
            return Ok(serde_json::json!("mock text"));
        }

        if path.ends_with("/displayed") || path.ends_with("/enabled") {
            return Ok(serde_json::json!(true));
        }

        if path.ends_with("/screenshot") {
            return Ok(serde_json::json!(MOCK_SCREENSHOT_B64));
        }

        if path.ends_with("/window/handles") {
            return Ok(serde_json::json!(["mock-window-1"]));
        }

        if path.ends_with("/window") && method == WireMethod::Get {
            return Ok(serde_json::json!("mock-window-1"));
        }

        if path.ends_with("/execute/sync") {
            return Ok(serde_json::Value::Null);
        }

        // timeouts, click, clear, value, maximize, window switch, status...
        Ok(serde_json::json!({ "ready": true }))
    }

    fn endpoint(&self) -> &str {
        "http://127.0.0.1:0"
    }
}
