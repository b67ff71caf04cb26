use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Endpoint {addr} unavailable: {reason}")]
    EndpointUnavailable { addr: String, reason: String },

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Failed to connect to {addr}: {reason}")]
    ConnectionFailed { addr: String, reason: String },

    #[error("Call timed out after {}ms", .0.as_millis())]
    CallTimeout(Duration),

    #[error("Call failed: {0}")]
    CallFailed(#[source] Box<RpcError>),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Connection is not open")]
    NotConnected,

    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpcError {
    /// Wraps an error into `CallFailed`, leaving existing `CallFailed` values as they are.
    pub fn call_failed(err: RpcError) -> Self {
        match err {
            RpcError::CallFailed(_) => err,
            other => RpcError::CallFailed(Box::new(other)),
        }
    }

    /// The error carried by a `CallFailed`, if this is one.
    pub fn call_failure(&self) -> Option<&RpcError> {
        match self {
            RpcError::CallFailed(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::MalformedMessage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
