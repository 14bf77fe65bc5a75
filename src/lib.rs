//! Gatehouse - a greeter served over gRPC and a transcoded HTTP/JSON gateway
//!
//! One process runs two listeners. The gRPC listener serves the
//! `gatehouse.v1.Greeter` and `gatehouse.v1.Health` contracts; the HTTP
//! front door transcodes JSON requests into gRPC calls over a loopback
//! bridge channel and also serves static API documentation.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse::{Config, Handlers, Lifecycle};
//!
//! #[tokio::main]
//! async fn main() -> gatehouse::Result<()> {
//!     let config = Config::load(None)?;
//!     let handlers = Handlers::default();
//!
//!     Lifecycle::new(config, handlers)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod front_door;
pub mod gateway;
pub mod handler;
pub mod lifecycle;
pub mod logging;
pub mod proto;
pub mod server;
pub mod telemetry;
pub mod traits;
pub mod validation;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{GatehouseError, Result};
pub use handler::{Gatehouse, Handlers, Validating};
pub use lifecycle::{DrainOutcome, Lifecycle, Phase, Running, ShutdownReport};
pub use server::config::Config;
pub use traits::{GreeterHandler, HealthHandler, StatusStream};
pub use validation::{Validate, ValidationPolicy};
