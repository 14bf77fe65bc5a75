//! gRPC service implementations.
//!
//! Thin adapters from the generated tonic traits to the crate's handler
//! traits. Handler errors become [`tonic::Status`] through
//! `From<GatehouseError>`.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures_util::{Stream, StreamExt};
use tonic::service::Routes;
use tonic::{Request, Response, Status};
use tracing::{debug, instrument, warn};

use crate::GatehouseError;
use crate::handler::Handlers;
use crate::proto::greeter_server::{Greeter, GreeterServer};
use crate::proto::health_server::{Health, HealthServer};
use crate::proto::{GreetReply, GreetRequest, HealthCheckRequest, HealthCheckResponse};
use crate::telemetry;
use crate::traits::{GreeterHandler, HealthHandler};

/// Log a handler failure: per-request errors at DEBUG, the rest at WARN.
fn log_failure(method: &'static str, err: &GatehouseError) {
    if err.is_request_error() {
        debug!(method, error = %err, "request rejected");
    } else {
        warn!(method, error = %err, "handler failed");
    }
}

fn into_status<T>(method: &'static str, result: crate::Result<T>) -> Result<T, Status> {
    result.map_err(|err| {
        log_failure(method, &err);
        Status::from(err)
    })
}

fn outcome<T>(result: &Result<T, Status>) -> tonic::Code {
    match result {
        Ok(_) => tonic::Code::Ok,
        Err(status) => status.code(),
    }
}

/// gRPC `gatehouse.v1.Greeter` backed by a [`GreeterHandler`].
pub struct GreeterService {
    handler: Arc<dyn GreeterHandler>,
}

impl GreeterService {
    pub fn new(handler: Arc<dyn GreeterHandler>) -> Self {
        Self { handler }
    }
}

#[tonic::async_trait]
impl Greeter for GreeterService {
    #[instrument(skip_all, name = "rpc.greet")]
    async fn greet(&self, request: Request<GreetRequest>) -> Result<Response<GreetReply>, Status> {
        let start = Instant::now();
        let result = into_status("greet", self.handler.greet(request.into_inner()).await);
        telemetry::record_rpc("greet", start, outcome(&result));
        result.map(Response::new)
    }
}

/// gRPC `gatehouse.v1.Health` backed by a [`HealthHandler`].
pub struct HealthService {
    handler: Arc<dyn HealthHandler>,
}

impl HealthService {
    pub fn new(handler: Arc<dyn HealthHandler>) -> Self {
        Self { handler }
    }
}

type WatchResponseStream = Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send>>;

#[tonic::async_trait]
impl Health for HealthService {
    #[instrument(skip_all, name = "rpc.check")]
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let start = Instant::now();
        let service = request.into_inner().service;
        let result = into_status("check", self.handler.check(&service).await)
            .map(HealthCheckResponse::with_status);
        telemetry::record_rpc("check", start, outcome(&result));
        result.map(Response::new)
    }

    type WatchStream = WatchResponseStream;

    #[instrument(skip_all, name = "rpc.watch")]
    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let start = Instant::now();
        let service = request.into_inner().service;
        let result = into_status("watch", self.handler.watch(&service).await).map(|updates| {
            let mapped = updates.map(|update| {
                update
                    .map(HealthCheckResponse::with_status)
                    .map_err(Status::from)
            });
            Box::pin(mapped) as WatchResponseStream
        });
        telemetry::record_rpc("watch", start, outcome(&result));
        result.map(Response::new)
    }
}

/// The gRPC dispatch table for one set of handlers.
pub fn rpc_routes(handlers: &Handlers) -> Routes {
    Routes::new(GreeterServer::new(GreeterService::new(handlers.greeter.clone())))
        .add_service(HealthServer::new(HealthService::new(handlers.health.clone())))
}
