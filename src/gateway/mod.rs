//! HTTP/JSON transcoding gateway.
//!
//! - `template`: URL path templates
//! - `mux`: the ordered route table and request transcoding
//! - `services`: HTTP bindings for the served contracts
//! - `bridge`: the loopback channel routes forward over
//! - `status`: gRPC status → HTTP status and JSON error body

pub mod bridge;
pub mod mux;
pub mod services;
pub mod status;
pub mod template;

pub use bridge::Bridge;
pub use mux::{BodyRule, HttpRule, MethodBinding, RouteHandler, ServeMux, ServiceDescriptor, unary};
pub use status::{ErrorBody, GatewayError, http_status};
pub use template::PathTemplate;
