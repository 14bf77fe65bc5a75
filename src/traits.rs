//! Handler traits for the served RPC contracts

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::proto::{GreetReply, GreetRequest, ServingStatus};
use crate::{GatehouseError, Result};

/// Stream of serving-status updates returned by [`HealthHandler::watch`].
pub type StatusStream = Pin<Box<dyn Stream<Item = Result<ServingStatus>> + Send>>;

/// Implements `gatehouse.v1.Greeter`.
#[async_trait]
pub trait GreeterHandler: Send + Sync {
    /// Greet the caller by name.
    async fn greet(&self, request: GreetRequest) -> Result<GreetReply>;
}

/// Implements `gatehouse.v1.Health`.
///
/// Every method has a default that fails with [`GatehouseError::NotImplemented`],
/// so a handler only overrides what it actually supports.
#[async_trait]
pub trait HealthHandler: Send + Sync {
    /// Report the serving status of `service` (empty for the whole server).
    async fn check(&self, _service: &str) -> Result<ServingStatus> {
        Err(GatehouseError::NotImplemented("check"))
    }

    /// Stream status changes for `service`.
    async fn watch(&self, _service: &str) -> Result<StatusStream> {
        Err(GatehouseError::NotImplemented("watch"))
    }
}
