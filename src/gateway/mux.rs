//! The transcoding route table.
//!
//! [`ServeMux`] holds an ordered list of (HTTP method, path template) →
//! RPC method routes. Dispatch picks the first registered route whose
//! template and method both match, assembles a JSON object from the request,
//! and hands it to the route's [`RouteHandler`], which deserializes it into
//! the RPC request and forwards it over the bridge channel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use futures_util::future::{self, BoxFuture};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tonic::transport::Channel;
use tonic::{Code, Status};
use tracing::{debug, info};

use super::status::GatewayError;
use super::template::PathTemplate;
use crate::proto::health_client::HealthClient;
use crate::proto::{HealthCheckRequest, HealthCheckResponse, ServingStatus};
use crate::{GatehouseError, Result, telemetry};

/// Largest accepted JSON body, matching gRPC's default message limit.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Forwards one JSON-shaped request to an RPC method.
pub type RouteHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, std::result::Result<Value, Status>> + Send + Sync>;

/// Build a [`RouteHandler`] for a unary RPC call.
///
/// The JSON object is deserialized into `Req`; a shape mismatch fails with
/// invalid argument before any RPC is made. Path variables arrive
/// percent-decoded and null fields are already dropped.
pub fn unary<Req, Resp, F, Fut>(call: F) -> RouteHandler
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<tonic::Response<Resp>, Status>> + Send + 'static,
{
    Arc::new(move |value: Value| -> BoxFuture<'static, std::result::Result<Value, Status>> {
        let request = match serde_json::from_value::<Req>(value) {
            Ok(request) => request,
            Err(e) => {
                return Box::pin(future::ready(Err(Status::invalid_argument(format!(
                    "malformed request: {e}"
                )))));
            }
        };
        let pending = call(request);
        Box::pin(async move {
            let response = pending.await?.into_inner();
            serde_json::to_value(response)
                .map_err(|e| Status::internal(format!("failed to encode response: {e}")))
        })
    })
}

/// Where the RPC request comes from in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    /// Fields come from path variables and query parameters only.
    None,
    /// The whole JSON body is the request message (`body: "*"`).
    All,
}

/// HTTP side of one method binding.
#[derive(Debug, Clone)]
pub struct HttpRule {
    pub method: Method,
    pub template: &'static str,
    pub body: BodyRule,
}

impl HttpRule {
    pub fn get(template: &'static str) -> Self {
        Self {
            method: Method::GET,
            template,
            body: BodyRule::None,
        }
    }

    pub fn post(template: &'static str) -> Self {
        Self {
            method: Method::POST,
            template,
            body: BodyRule::All,
        }
    }
}

/// An RPC method exposed at one HTTP rule.
#[derive(Clone)]
pub struct MethodBinding {
    pub rpc_method: &'static str,
    pub rule: HttpRule,
    pub handler: RouteHandler,
}

/// A service's method set as seen by the gateway.
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub bindings: Vec<MethodBinding>,
}

impl ServiceDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bindings: Vec::new(),
        }
    }

    /// Expose `rpc_method` at `rule`.
    pub fn bind(mut self, rpc_method: &'static str, rule: HttpRule, handler: RouteHandler) -> Self {
        self.bindings.push(MethodBinding {
            rpc_method,
            rule,
            handler,
        });
        self
    }
}

struct Route {
    method: Method,
    template: PathTemplate,
    body: BodyRule,
    rpc: String,
    handler: RouteHandler,
}

struct HealthEndpoint {
    path: String,
    client: HealthClient<Channel>,
}

/// Ordered (method, template) → RPC route table.
#[derive(Default)]
pub struct ServeMux {
    routes: Vec<Route>,
    health: Option<HealthEndpoint>,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every binding of `descriptor` to the table.
    ///
    /// Fails without modifying the table if any template is malformed.
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> Result<()> {
        let mut routes = Vec::with_capacity(descriptor.bindings.len());
        for binding in descriptor.bindings {
            let template = PathTemplate::parse(binding.rule.template).map_err(|e| {
                GatehouseError::Registration {
                    service: descriptor.name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            routes.push(Route {
                method: binding.rule.method,
                template,
                body: binding.rule.body,
                rpc: format!("{}/{}", descriptor.name, binding.rpc_method),
                handler: binding.handler,
            });
        }

        for route in &routes {
            debug!(method = %route.method, template = %route.template, rpc = %route.rpc, "registered route");
        }
        info!(service = descriptor.name, routes = routes.len(), "registered service on gateway");
        self.routes.extend(routes);
        Ok(())
    }

    /// Serve a synthetic health endpoint at `path`, backed by the health
    /// service behind `channel`.
    pub fn with_health_endpoint(mut self, path: impl Into<String>, channel: Channel) -> Self {
        self.health = Some(HealthEndpoint {
            path: path.into(),
            client: HealthClient::new(channel),
        });
        self
    }

    /// Registered routes as (method, template, rpc) in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str, &str)> {
        self.routes
            .iter()
            .map(|r| (&r.method, r.template.as_str(), r.rpc.as_str()))
    }

    /// Wrap the table in a router that sends every request through [`dispatch`](Self::dispatch).
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(dispatch_request)
            .with_state(Arc::new(self))
    }

    /// Transcode one HTTP request.
    pub async fn dispatch(&self, request: Request) -> Response {
        let path = request.uri().path().to_string();

        if let Some(health) = self.health.as_ref().filter(|h| h.path == path) {
            let (method, uri) = (request.method().clone(), request.uri().clone());
            let response = health_check(health, &method, &uri).await;
            telemetry::record_gateway(&health.path, response.status().as_u16());
            return response;
        }

        let mut path_matched = false;
        let found = self.routes.iter().find_map(|route| {
            let captures = route.template.matches(&path)?;
            path_matched = true;
            (route.method == request.method()).then_some((route, captures))
        });

        let Some((route, captures)) = found else {
            let err = if path_matched {
                GatewayError::with_status(
                    StatusCode::METHOD_NOT_ALLOWED,
                    Code::Unimplemented,
                    "Method Not Allowed",
                )
            } else {
                GatewayError::new(Code::NotFound, "Not Found")
            };
            telemetry::record_gateway("unmatched", err.status().as_u16());
            return err.into_response();
        };

        let response = match self.call(route, captures, request).await {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            Err(err) => err.into_response(),
        };
        telemetry::record_gateway(route.template.as_str(), response.status().as_u16());
        response
    }

    async fn call(
        &self,
        route: &Route,
        captures: Vec<(String, String)>,
        request: Request,
    ) -> std::result::Result<Value, GatewayError> {
        let mut fields = match route.body {
            BodyRule::All => read_json_object(request.into_body()).await?,
            BodyRule::None => query_fields(request.uri())?,
        };
        for (name, raw) in captures {
            let value = percent_decode_str(&raw).decode_utf8().map_err(|_| {
                GatewayError::new(
                    Code::InvalidArgument,
                    format!("path variable {name} is not valid UTF-8"),
                )
            })?;
            fields.insert(name, Value::String(value.into_owned()));
        }
        // A null field means the field's default value.
        fields.retain(|_, value| !value.is_null());

        debug!(rpc = %route.rpc, "forwarding transcoded call");
        (route.handler)(Value::Object(fields))
            .await
            .map_err(GatewayError::from)
    }
}

async fn dispatch_request(State(mux): State<Arc<ServeMux>>, request: Request) -> Response {
    mux.dispatch(request).await
}

/// Answer the synthetic health endpoint from the bridged health service.
///
/// `SERVING` is 200; any other status, or a failed check, is 503.
async fn health_check(health: &HealthEndpoint, method: &Method, uri: &Uri) -> Response {
    if method != Method::GET {
        return GatewayError::with_status(
            StatusCode::METHOD_NOT_ALLOWED,
            Code::Unimplemented,
            "Method Not Allowed",
        )
        .into_response();
    }

    let service = query_fields(uri)
        .ok()
        .and_then(|mut f| f.remove("service"))
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let mut client = health.client.clone();
    match client.check(HealthCheckRequest { service }).await {
        Ok(response) => {
            let response: HealthCheckResponse = response.into_inner();
            let code = if response.status() == ServingStatus::Serving {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (code, Json(response)).into_response()
        }
        Err(status) => GatewayError::with_status(
            StatusCode::SERVICE_UNAVAILABLE,
            status.code(),
            status.message(),
        )
        .into_response(),
    }
}

async fn read_json_object(body: Body) -> std::result::Result<Map<String, Value>, GatewayError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::new(Code::InvalidArgument, format!("failed to read body: {e}")))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(GatewayError::new(
            Code::InvalidArgument,
            "request body must be a JSON object",
        )),
        Err(e) => Err(GatewayError::new(
            Code::InvalidArgument,
            format!("malformed JSON body: {e}"),
        )),
    }
}

fn query_fields(uri: &Uri) -> std::result::Result<Map<String, Value>, GatewayError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|e| GatewayError::new(Code::InvalidArgument, e.body_text()))?;
    Ok(params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}
