//! Gatehouse error types

use std::net::SocketAddr;

/// Gatehouse error types
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    // Per-request errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),

    // Fatal startup errors
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to dial bridge at {target}: {reason}")]
    Dial { target: String, reason: String },

    #[error("failed to register service {service}: {reason}")]
    Registration { service: String, reason: String },

    #[error("server error: {0}")]
    Serve(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Remote call errors seen by clients
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote error ({code:?}): {message}")]
    Remote { code: tonic::Code, message: String },
}

impl GatehouseError {
    /// Whether this error belongs to a single request rather than the process.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            GatehouseError::InvalidArgument(_)
                | GatehouseError::NotImplemented(_)
                | GatehouseError::Remote { .. }
        )
    }
}

impl From<GatehouseError> for tonic::Status {
    fn from(err: GatehouseError) -> Self {
        match err {
            GatehouseError::InvalidArgument(message) => tonic::Status::invalid_argument(message),
            GatehouseError::NotImplemented(method) => {
                tonic::Status::unimplemented(format!("method {method} not implemented"))
            }
            GatehouseError::Remote { code, message } => tonic::Status::new(code, message),
            other => tonic::Status::internal(other.to_string()),
        }
    }
}

impl From<tonic::Status> for GatehouseError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::InvalidArgument => {
                GatehouseError::InvalidArgument(status.message().to_string())
            }
            // Message text is not 'static; keep it as a remote error.
            code => GatehouseError::Remote {
                code,
                message: status.message().to_string(),
            },
        }
    }
}

/// Result type alias for Gatehouse operations
pub type Result<T> = std::result::Result<T, GatehouseError>;
