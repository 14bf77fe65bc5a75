//! gRPC server side.
//!
//! This module provides:
//! - The gRPC service implementations (`service`)
//! - Daemon configuration types (`config`)
//!
//! Generated stubs and message types live in [`crate::proto`].

pub mod config;
pub mod service;

pub use service::{GreeterService, HealthService, rpc_routes};
