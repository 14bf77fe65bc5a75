//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gatehouse::gateway::Bridge;
use gatehouse::proto::{GreetReply, GreetRequest};
use gatehouse::server::rpc_routes;
use gatehouse::{Config, Gatehouse, GreeterHandler, Handlers, HealthHandler};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};

/// Start a gRPC server for `handlers` on a random loopback port.
///
/// The listener is bound before this returns, so callers can dial at once.
pub async fn start_rpc_server(handlers: Handlers) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = rpc_routes(&handlers);

    tokio::spawn(async move {
        Server::builder()
            .add_routes(routes)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr
}

/// Start a default server and return a bridge channel to it.
pub async fn bridge_channel() -> Channel {
    let addr = start_rpc_server(Handlers::default()).await;
    Bridge::dial(addr, Duration::from_secs(5))
        .await
        .unwrap()
        .channel()
}

/// Config that binds both listeners on random loopback ports.
pub fn test_config(docs_root: &Path) -> Config {
    let mut config = Config::default();
    config.server.rpc_address = "127.0.0.1:0".to_string();
    config.server.http_address = "127.0.0.1:0".to_string();
    config.docs.asset_dir = docs_root.join("swagger-ui");
    config.docs.api_description = docs_root.join("service.swagger.json");
    config
}

pub const SWAGGER_JSON: &str = r#"{"swagger":"2.0","info":{"title":"test","version":"1.0"}}"#;
pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body>docs</body></html>";

/// Lay out a docs fixture: `service.swagger.json` and `swagger-ui/index.html`.
pub fn write_docs(root: &Path) {
    std::fs::write(root.join("service.swagger.json"), SWAGGER_JSON).unwrap();
    std::fs::create_dir_all(root.join("swagger-ui")).unwrap();
    std::fs::write(root.join("swagger-ui").join("index.html"), INDEX_HTML).unwrap();
}

/// Greeter that takes `delay` before answering; health keeps the trait defaults.
pub struct SlowGreeter {
    pub delay: Duration,
}

#[async_trait]
impl GreeterHandler for SlowGreeter {
    async fn greet(&self, request: GreetRequest) -> gatehouse::Result<GreetReply> {
        tokio::time::sleep(self.delay).await;
        Gatehouse.greet(request).await
    }
}

#[async_trait]
impl HealthHandler for SlowGreeter {}

/// Default health handler with a greet that takes `delay`.
pub fn slow_handlers(delay: Duration) -> Handlers {
    Handlers {
        greeter: Arc::new(SlowGreeter { delay }),
        health: Arc::new(Gatehouse),
    }
}
