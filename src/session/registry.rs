//! Session registry
//!
//! Owns at most one live session per worker. Workers are explicit identities
//! handed out by the runner rather than OS thread ids, so the ownership model
//! is the same whether cases run sequentially or as parallel tasks.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::config::Config;
use crate::session::factory::SessionFactory;
use crate::session::traits::Session;
use crate::{Error, Result};

/// Identity of one logical thread of control executing a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub u64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Async constructor the registry uses to build sessions, keyed by browser
/// kind and headless flag
pub type SessionBuilder =
    Arc<dyn Fn(String, bool) -> BoxFuture<'static, Result<Arc<dyn Session>>> + Send + Sync>;

/// Session registry
///
/// Lifecycle per worker: bound at the first `current` call inside a test
/// attempt, unbound at `release` in teardown. Sessions are never shared
/// between workers and never pooled across attempts.
pub struct SessionRegistry {
    builder: SessionBuilder,
    default_browser: String,
    default_headless: bool,
    sessions: RwLock<HashMap<WorkerId, Arc<dyn Session>>>,
    overrides: RwLock<HashMap<WorkerId, String>>,
}

impl SessionRegistry {
    /// Create a registry backed by the real session factory
    pub fn new(config: Arc<Config>) -> Self {
        let factory = SessionFactory::new(Arc::clone(&config));
        let builder: SessionBuilder = Arc::new(move |kind, headless| {
            let factory = factory.clone();
            Box::pin(async move { factory.create(&kind, headless).await })
        });

        Self::with_builder(config.browser.clone(), config.headless, builder)
    }

    /// Create a registry with a custom session builder
    pub fn with_builder(
        default_browser: String,
        default_headless: bool,
        builder: SessionBuilder,
    ) -> Self {
        Self {
            builder,
            default_browser,
            default_headless,
            sessions: RwLock::new(HashMap::new()),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry that builds mock sessions, for testing
    pub fn mock() -> Self {
        Self::with_builder(
            "chrome".to_string(),
            true,
            Arc::new(|_, _| {
                Box::pin(async { Ok(crate::session::mock::MockSession::new() as Arc<dyn Session>) })
            }),
        )
    }

    /// Override the browser kind for a worker.
    ///
    /// Takes effect on the worker's next session creation; an already-bound
    /// session is not replaced.
    pub fn set_override(&self, worker: WorkerId, browser: &str) -> Result<()> {
        self.overrides
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(worker, browser.to_string());
        Ok(())
    }

    /// The worker's session, created on first access
    pub async fn current(&self, worker: WorkerId) -> Result<Arc<dyn Session>> {
        if let Some(session) = self
            .sessions
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(&worker)
        {
            return Ok(Arc::clone(session));
        }

        let browser = self
            .overrides
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(&worker)
            .cloned()
            .unwrap_or_else(|| self.default_browser.clone());

        debug!("Creating {} session for {}", browser, worker);
        let session = (self.builder)(browser, self.default_headless).await?;

        self.sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(worker, Arc::clone(&session));

        Ok(session)
    }

    /// The worker's session if one is currently bound, without creating one
    pub fn existing(&self, worker: WorkerId) -> Option<Arc<dyn Session>> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(&worker).cloned())
    }

    /// Close and unbind the worker's session; no-op if already released
    pub async fn release(&self, worker: WorkerId) -> Result<()> {
        let session = self
            .sessions
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(&worker);

        // The binding is cleared before close so a close failure cannot leave
        // a dead session observable through `current`.
        if let Some(session) = session {
            info!("Releasing session {} for {}", session.id(), worker);
            session.close().await?;
        }

        Ok(())
    }

    /// Number of live sessions across all workers
    pub fn active_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}
