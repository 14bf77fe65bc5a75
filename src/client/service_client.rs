//! [`GatehouseClient`]: typed client for a running gatehoused over gRPC.

use futures_util::StreamExt;
use tonic::transport::Channel;

use crate::proto::greeter_client::GreeterClient;
use crate::proto::health_client::HealthClient;
use crate::proto::{GreetRequest, HealthCheckRequest, ServingStatus};
use crate::traits::StatusStream;
use crate::{GatehouseError, Result};

/// Client for both served contracts, sharing one channel.
#[derive(Debug, Clone)]
pub struct GatehouseClient {
    greeter: GreeterClient<Channel>,
    health: HealthClient<Channel>,
}

impl GatehouseClient {
    /// Connect to a gatehoused gRPC listener.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GatehouseClient::connect("http://127.0.0.1:8080").await?;
    /// ```
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| GatehouseError::Transport(format!("invalid address {addr}: {e}")))?
            .connect()
            .await
            .map_err(|e| GatehouseError::Transport(format!("failed to connect to {addr}: {e}")))?;
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            greeter: GreeterClient::new(channel.clone()),
            health: HealthClient::new(channel),
        }
    }

    /// Call `Greeter/Greet` and return the message.
    pub async fn greet(&self, name: impl Into<String>) -> Result<String> {
        let request = GreetRequest { name: name.into() };
        let reply = self.greeter.clone().greet(request).await?.into_inner();
        Ok(reply.message)
    }

    /// Call `Health/Check`.
    pub async fn check(&self, service: impl Into<String>) -> Result<ServingStatus> {
        let request = HealthCheckRequest {
            service: service.into(),
        };
        let response = self.health.clone().check(request).await?.into_inner();
        Ok(response.status())
    }

    /// Call `Health/Watch` and stream status updates.
    pub async fn watch(
        &self,
        service: impl Into<String>,
    ) -> Result<StatusStream> {
        let request = HealthCheckRequest {
            service: service.into(),
        };
        let updates = self.health.clone().watch(request).await?.into_inner();
        Ok(Box::pin(updates.map(|update| {
            update
                .map(|response| response.status())
                .map_err(GatehouseError::from)
        })))
    }
}
