//! Test cases and their execution context

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::harness::retry::RetryPolicy;
use crate::interact::{ConsentDismisser, InteractionEngine, WaitSettings};
use crate::session::{Session, SessionRegistry, WorkerId};
use crate::{Error, Result};

type CaseBody = Arc<dyn Fn(TestContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// One registered test case
#[derive(Clone)]
pub struct TestCase {
    name: String,
    body: CaseBody,
    retry_override: Option<RetryPolicy>,
}

impl TestCase {
    /// Register an async test body under a name
    pub fn new<N, F, Fut>(name: N, body: F) -> Self
    where
        N: Into<String>,
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(move |ctx| Box::pin(body(ctx))),
            retry_override: None,
        }
    }

    /// Declare an explicit retry policy; cases without one get the runner's
    /// default installed at startup
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_override = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn retry_override(&self) -> Option<RetryPolicy> {
        self.retry_override
    }

    pub(crate) fn set_retry_override(&mut self, policy: RetryPolicy) {
        self.retry_override = Some(policy);
    }

    pub(crate) async fn execute(&self, ctx: TestContext) -> Result<()> {
        (self.body)(ctx).await
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("retry_override", &self.retry_override)
            .finish()
    }
}

/// Execution context handed to each test attempt
///
/// Carries the worker identity so everything the body touches stays bound to
/// this logical thread of control.
#[derive(Clone)]
pub struct TestContext {
    pub worker: WorkerId,
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

impl TestContext {
    /// The worker's session, created on first access
    pub async fn session(&self) -> Result<Arc<dyn Session>> {
        self.registry.current(self.worker).await
    }

    /// An interaction engine over the worker's session, with waits from
    /// configuration
    pub async fn engine(&self) -> Result<InteractionEngine> {
        let session = self.session().await?;
        Ok(InteractionEngine::new(
            session,
            WaitSettings::from_config(&self.config),
        ))
    }

    /// The configured consent dismisser
    pub fn consent(&self) -> ConsentDismisser {
        ConsentDismisser::new(&self.config.consent)
    }
}

/// Fail the current attempt unless `condition` holds
pub fn require<S: Into<String>>(condition: bool, message: S) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::assertion_failed(message))
    }
}
