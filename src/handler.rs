//! The concrete server identity and the validation layer in front of it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::Result;
use crate::proto::{GreetReply, GreetRequest, ServingStatus};
use crate::traits::{GreeterHandler, HealthHandler, StatusStream};
use crate::validation::{GreetForm, Validate, ValidationPolicy};

/// Suffix appended to every greeted name.
pub const GREETING_SUFFIX: &str = " world";

/// Stateless handler for both served contracts.
///
/// Health checks always report [`ServingStatus::Serving`]; `watch` keeps the
/// trait default and answers unimplemented.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gatehouse;

impl Gatehouse {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GreeterHandler for Gatehouse {
    async fn greet(&self, request: GreetRequest) -> Result<GreetReply> {
        Ok(GreetReply {
            message: format!("{}{GREETING_SUFFIX}", request.name),
        })
    }
}

#[async_trait]
impl HealthHandler for Gatehouse {
    async fn check(&self, _service: &str) -> Result<ServingStatus> {
        Ok(ServingStatus::Serving)
    }
}

/// Validates requests before delegating to the wrapped handler.
#[derive(Debug, Clone, Default)]
pub struct Validating<H> {
    inner: H,
}

impl<H> Validating<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: GreeterHandler> GreeterHandler for Validating<H> {
    async fn greet(&self, request: GreetRequest) -> Result<GreetReply> {
        if let Err(err) = GreetForm::from(&request).validate() {
            debug!(error = %err, "rejected greet request");
            return Err(err);
        }
        self.inner.greet(request).await
    }
}

#[async_trait]
impl<H: HealthHandler> HealthHandler for Validating<H> {
    async fn check(&self, service: &str) -> Result<ServingStatus> {
        self.inner.check(service).await
    }

    async fn watch(&self, service: &str) -> Result<StatusStream> {
        self.inner.watch(service).await
    }
}

/// The handler pair served by one process.
#[derive(Clone)]
pub struct Handlers {
    pub greeter: Arc<dyn GreeterHandler>,
    pub health: Arc<dyn HealthHandler>,
}

impl Handlers {
    /// Serve `handler` for both contracts, validating requests when the
    /// policy asks for it.
    pub fn with_policy<H>(handler: H, policy: ValidationPolicy) -> Self
    where
        H: GreeterHandler + HealthHandler + 'static,
    {
        match policy {
            ValidationPolicy::Enforce => Self::shared(Arc::new(Validating::new(handler))),
            ValidationPolicy::Skip => Self::shared(Arc::new(handler)),
        }
    }

    fn shared<H>(handler: Arc<H>) -> Self
    where
        H: GreeterHandler + HealthHandler + 'static,
    {
        Self {
            greeter: handler.clone(),
            health: handler,
        }
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::with_policy(Gatehouse::new(), ValidationPolicy::default())
    }
}
