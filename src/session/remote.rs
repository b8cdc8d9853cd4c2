//! Remote session implementation
//!
//! Drives one browser through a WebDriver server over the wire client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::session::traits::{BrowserKind, ElementHandle, Locator, Session};
use crate::webdriver::{element_id_from, DriverServer, WireClient, WireMethod};
use crate::{Error, Result};

/// Remote session implementation
#[derive(Debug)]
pub struct RemoteSession {
    id: String,
    kind: BrowserKind,
    wire: Arc<dyn WireClient>,
    server: Mutex<Option<DriverServer>>,
    is_active: AtomicBool,
}

impl RemoteSession {
    /// Create a WebDriver session on an already-running server.
    ///
    /// Takes ownership of the server handle so the process is terminated
    /// together with the session; on failure the server is shut down before
    /// the error is returned.
    pub async fn open(
        wire: Arc<dyn WireClient>,
        server: Option<DriverServer>,
        kind: BrowserKind,
        capabilities: serde_json::Value,
    ) -> Result<Self> {
        let response = match wire
            .send(WireMethod::Post, "/session", Some(capabilities))
            .await
        {
            Ok(value) => value,
            Err(e) => {
                if let Some(mut server) = server {
                    server.shutdown().await;
                }
                return Err(e);
            }
        };

        let id = response
            .get("sessionId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let id = match id {
            Some(id) => id,
            None => {
                if let Some(mut server) = server {
                    server.shutdown().await;
                }
                return Err(Error::wire("No sessionId in new session response"));
            }
        };

        info!("Opened {} session {}", kind, id);

        Ok(Self {
            id,
            kind,
            wire,
            server: Mutex::new(server),
            is_active: AtomicBool::new(true),
        })
    }

    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.id, suffix)
    }
}

#[async_trait]
impl Session for RemoteSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> BrowserKind {
        self.kind
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating session {} to {}", self.id, url);
        self.wire
            .send(
                WireMethod::Post,
                &self.path("/url"),
                Some(json!({ "url": url })),
            )
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/url"), None)
            .await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::wire("Current URL is not a string"))
    }

    async fn title(&self) -> Result<String> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/title"), None)
            .await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::wire("Page title is not a string"))
    }

    async fn find(&self, locator: &Locator) -> Result<Arc<dyn ElementHandle>> {
        let value = self
            .wire
            .send(
                WireMethod::Post,
                &self.path("/element"),
                Some(json!({ "using": locator.using(), "value": locator.value() })),
            )
            .await?;

        let element_id = element_id_from(&value)?;

        Ok(Arc::new(RemoteElement {
            session_id: self.id.clone(),
            element_id,
            wire: Arc::clone(&self.wire),
        }))
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        self.wire
            .send(
                WireMethod::Post,
                &self.path("/execute/sync"),
                Some(json!({ "script": script, "args": args })),
            )
            .await
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/screenshot"), None)
            .await?;

        let data = value
            .as_str()
            .ok_or_else(|| Error::wire("No data in screenshot response"))?;

        BASE64
            .decode(data)
            .map_err(|e| Error::wire(format!("Failed to decode screenshot: {}", e)))
    }

    async fn window_handles(&self) -> Result<Vec<String>> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/window/handles"), None)
            .await?;

        value
            .as_array()
            .map(|handles| {
                handles
                    .iter()
                    .filter_map(|h| h.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .ok_or_else(|| Error::wire("Window handles is not an array"))
    }

    async fn current_window(&self) -> Result<String> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/window"), None)
            .await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::wire("Window handle is not a string"))
    }

    async fn switch_to_window(&self, handle: &str) -> Result<()> {
        self.wire
            .send(
                WireMethod::Post,
                &self.path("/window"),
                Some(json!({ "handle": handle })),
            )
            .await?;
        Ok(())
    }

    async fn maximize(&self) -> Result<()> {
        self.wire
            .send(WireMethod::Post, &self.path("/window/maximize"), None)
            .await?;
        Ok(())
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> Result<()> {
        self.wire
            .send(
                WireMethod::Post,
                &self.path("/timeouts"),
                Some(json!({
                    "implicit": implicit.as_millis() as u64,
                    "pageLoad": page_load.as_millis() as u64,
                })),
            )
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        debug!("Closing session {}", self.id);

        if let Err(e) = self
            .wire
            .send(WireMethod::Delete, &self.path(""), None)
            .await
        {
            warn!("Failed to delete session {}: {}", self.id, e);
        }

        if let Some(mut server) = self.server.lock().await.take() {
            server.shutdown().await;
        }

        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}

/// Remote element handle
pub struct RemoteElement {
    session_id: String,
    element_id: String,
    wire: Arc<dyn WireClient>,
}

impl RemoteElement {
    fn path(&self, suffix: &str) -> String {
        format!(
            "/session/{}/element/{}{}",
            self.session_id, self.element_id, suffix
        )
    }
}

#[async_trait]
impl ElementHandle for RemoteElement {
    fn id(&self) -> &str {
        &self.element_id
    }

    async fn click(&self) -> Result<()> {
        self.wire
            .send(WireMethod::Post, &self.path("/click"), None)
            .await?;
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/text"), None)
            .await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::wire("Element text is not a string"))
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.wire
            .send(
                WireMethod::Post,
                &self.path("/value"),
                Some(json!({ "text": text })),
            )
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.wire
            .send(WireMethod::Post, &self.path("/clear"), None)
            .await?;
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/displayed"), None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self) -> Result<bool> {
        let value = self
            .wire
            .send(WireMethod::Get, &self.path("/enabled"), None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn wire_reference(&self) -> serde_json::Value {
        crate::webdriver::types::element_arg(&self.element_id)
    }
}
