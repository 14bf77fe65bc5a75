//! Loopback bridge client.
//!
//! The gateway forwards transcoded calls into this process's own gRPC
//! listener over one channel, dialed once at startup and then only cloned.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::info;

use crate::{GatehouseError, Result};

/// A connected channel to the local gRPC listener.
#[derive(Debug, Clone)]
pub struct Bridge {
    channel: Channel,
}

impl Bridge {
    /// Connect to the listener bound at `listen_addr`, waiting until the
    /// connection is established or `timeout` elapses.
    pub async fn dial(listen_addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let target = format!("http://{}", loopback_target(listen_addr));
        let dial_error = |reason: String| GatehouseError::Dial {
            target: target.clone(),
            reason,
        };

        let endpoint = Endpoint::from_shared(target.clone())
            .map_err(|e| dial_error(e.to_string()))?
            .connect_timeout(timeout);

        let channel = tokio::time::timeout(timeout, endpoint.connect())
            .await
            .map_err(|_| dial_error(format!("timed out after {timeout:?}")))?
            .map_err(|e| dial_error(e.to_string()))?;

        info!(%target, "bridge connected");
        Ok(Self { channel })
    }

    /// A handle on the shared channel.
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }
}

/// An unspecified bind address is reached through loopback.
pub fn loopback_target(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}
