//! HTTP wire client implementation
//!
//! One client per WebDriver server. Commands are plain HTTP/JSON round
//! trips; the W3C response envelope is unwrapped here and protocol errors
//! are mapped to crate error classes.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

use super::traits::{WireClient, WireMethod};
use super::types::error_from_code;
use crate::{Error, Result};

/// HTTP wire client implementation
#[derive(Debug, Clone)]
pub struct HttpWireClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpWireClient {
    /// Create a new wire client for a server root (e.g. `http://127.0.0.1:9515`)
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self> {
        let http = reqwest::Client::builder()
            // Page loads can legitimately take up to the session page-load
            // timeout; the transport must outlive them.
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Poll the server's `/status` endpoint until it reports ready
    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match self.send(WireMethod::Get, "/status", None).await {
                Ok(value) => {
                    if value
                        .get("ready")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false)
                    {
                        return Ok(());
                    }
                }
                Err(e) => trace!("Driver server not ready yet: {}", e),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(Error::timeout(format!(
                    "Driver server at {} not ready within {:?}",
                    self.endpoint, timeout
                )));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

#[async_trait]
impl WireClient for HttpWireClient {
    async fn send(
        &self,
        method: WireMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("{} {}", method.as_str(), url);

        let request = match method {
            WireMethod::Get => self.http.get(&url),
            // The protocol requires a JSON body on every POST, empty or not
            WireMethod::Post => self
                .http
                .post(&url)
                .json(&body.unwrap_or_else(|| serde_json::json!({}))),
            WireMethod::Delete => self.http.delete(&url),
        };

        let response = request.send().await?;
        let status = response.status();
        let envelope: serde_json::Value = response.json().await?;

        let value = envelope
            .get("value")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        if !status.is_success() {
            let code = value
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            let message = value
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("no message in error response")
                .to_string();
            return Err(error_from_code(code, message));
        }

        Ok(value)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
