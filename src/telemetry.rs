//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `gatehouse_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method`: RPC method (e.g. "greet", "check")
//! - `status`: outcome: "ok" or a lower-case gRPC code name
//! - `route`: matched gateway template, or "unmatched"
//! - `code`: HTTP status code of the gateway response

use std::time::Instant;

/// Total RPC calls handled by the gRPC services.
///
/// Labels: `method`, `status`.
pub const RPC_REQUESTS_TOTAL: &str = "gatehouse_rpc_requests_total";

/// RPC handling duration in seconds.
///
/// Labels: `method`.
pub const RPC_REQUEST_DURATION_SECONDS: &str = "gatehouse_rpc_request_duration_seconds";

/// Total HTTP requests dispatched by the transcoding gateway.
///
/// Labels: `route`, `code`.
pub const GATEWAY_REQUESTS_TOTAL: &str = "gatehouse_gateway_requests_total";

/// Record the outcome of one RPC call (counter + histogram).
pub(crate) fn record_rpc(method: &'static str, start: Instant, code: tonic::Code) {
    let status = match code {
        tonic::Code::Ok => "ok",
        tonic::Code::InvalidArgument => "invalid_argument",
        tonic::Code::Unimplemented => "unimplemented",
        _ => "error",
    };
    metrics::counter!(RPC_REQUESTS_TOTAL, "method" => method, "status" => status).increment(1);
    metrics::histogram!(RPC_REQUEST_DURATION_SECONDS, "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record one gateway dispatch.
pub(crate) fn record_gateway(route: &str, code: u16) {
    metrics::counter!(GATEWAY_REQUESTS_TOTAL,
        "route" => route.to_owned(),
        "code" => code.to_string(),
    )
    .increment(1);
}
