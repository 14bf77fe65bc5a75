//! HTTP front door.
//!
//! Mounts the transcoding gateway at the root and serves the static API
//! documentation:
//!
//! - `GET /docs/swagger.json`: the API description file
//! - `GET /docs/*`: the documentation UI directory, `/docs` stripped
//!
//! Every response passes through request logging, panic recovery and a
//! default `application/json` content type.

use std::any::Any;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error};

use crate::gateway::{GatewayError, ServeMux};
use crate::server::config::DocsConfig;

/// Build the complete front-door router.
pub fn router(mux: ServeMux, docs: &DocsConfig) -> Router {
    let routes = mux
        .into_router()
        .route_service("/docs/swagger.json", ServeFile::new(&docs.api_description))
        .nest_service("/docs", ServeDir::new(&docs.asset_dir));
    with_middleware(routes)
}

/// Apply the cross-cutting layers.
///
/// Layer order, outermost first: trace, panic recovery, content type.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "request handler panicked");
    GatewayError::new(tonic::Code::Internal, "internal server error").into_response()
}
