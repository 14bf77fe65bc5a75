//! Client library for connecting to gatehoused.
//!
//! Provides [`GatehouseClient`], which wraps the generated gRPC stubs and
//! converts [`tonic::Status`] into [`GatehouseError`](crate::GatehouseError).

mod service_client;

pub use service_client::GatehouseClient;
