//! HTTP bindings for the served RPC contracts.
//!
//! | RPC                          | HTTP                                         |
//! |------------------------------|----------------------------------------------|
//! | `gatehouse.v1.Greeter/Greet` | `POST /v1/greet` (JSON body), `GET /v1/greet/{name}` |
//! | `gatehouse.v1.Health/Check`  | `GET /v1/health`, `GET /v1/health/{service}` |
//!
//! `Health/Watch` is server-streaming and has no HTTP binding.

use tonic::transport::Channel;

use super::mux::{HttpRule, ServiceDescriptor, ServeMux, unary};
use crate::Result;
use crate::proto::greeter_client::GreeterClient;
use crate::proto::health_client::HealthClient;
use crate::proto::{GreetRequest, HealthCheckRequest};

pub const GREETER_SERVICE: &str = "gatehouse.v1.Greeter";
pub const HEALTH_SERVICE: &str = "gatehouse.v1.Health";

/// Gateway descriptor for `gatehouse.v1.Greeter`.
pub fn greeter(channel: Channel) -> ServiceDescriptor {
    let client = GreeterClient::new(channel);
    let greet = unary(move |request: GreetRequest| {
        let mut client = client.clone();
        async move { client.greet(request).await }
    });

    ServiceDescriptor::new(GREETER_SERVICE)
        .bind("Greet", HttpRule::post("/v1/greet"), greet.clone())
        .bind("Greet", HttpRule::get("/v1/greet/{name}"), greet)
}

/// Gateway descriptor for `gatehouse.v1.Health`.
pub fn health(channel: Channel) -> ServiceDescriptor {
    let client = HealthClient::new(channel);
    let check = unary(move |request: HealthCheckRequest| {
        let mut client = client.clone();
        async move { client.check(request).await }
    });

    ServiceDescriptor::new(HEALTH_SERVICE)
        .bind("Check", HttpRule::get("/v1/health"), check.clone())
        .bind("Check", HttpRule::get("/v1/health/{service}"), check)
}

/// Register every served contract on `mux`, forwarding over `channel`.
pub fn register_all(mux: &mut ServeMux, channel: &Channel) -> Result<()> {
    mux.register(greeter(channel.clone()))?;
    mux.register(health(channel.clone()))?;
    Ok(())
}
