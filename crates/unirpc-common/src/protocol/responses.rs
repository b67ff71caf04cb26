//! Response Envelope
//!
//! This module defines the envelope a server writes back for every request.

use serde::{Deserialize, Serialize};

use super::error::RpcError;
use super::{Payload, RequestId};

/// Status codes a server can return instead of a payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// The method exists in the contract but the bound service does not
    /// implement it, or the method name is unknown.
    NotImplemented,
    /// The request payload did not decode into the expected record.
    MalformedMessage,
    /// The service failed for any other reason.
    Internal,
}

/// Error status carried by a failed [`Response`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub message: String,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Status {
            code,
            message: message.into(),
        }
    }

    /// Converts the status into the error a caller sees.
    pub fn into_error(self) -> RpcError {
        match self.code {
            StatusCode::NotImplemented => RpcError::NotImplemented(self.message),
            StatusCode::MalformedMessage => RpcError::MalformedMessage(self.message),
            StatusCode::Internal => RpcError::Remote(self.message),
        }
    }
}

impl From<&RpcError> for Status {
    fn from(err: &RpcError) -> Self {
        match err {
            RpcError::NotImplemented(method) => Status::new(StatusCode::NotImplemented, method.clone()),
            RpcError::MalformedMessage(msg) => Status::new(StatusCode::MalformedMessage, msg.clone()),
            other => Status::new(StatusCode::Internal, other.to_string()),
        }
    }
}

/// An RPC response returned from the server to the client.
///
/// # Fields
///
/// - `id`: The request ID this response corresponds to
/// - `payload`: The encoded response record (present on success)
/// - `status`: The error status (present on failure)
///
/// # Example
///
/// ```
/// use unirpc_common::protocol::{Response, Status, StatusCode};
/// use serde_json::json;
///
/// let ok = Response::success(7, json!({"message": "Welcome onboard Ada"}));
/// assert!(ok.is_success());
///
/// let failed = Response::failure(7, Status::new(StatusCode::Internal, "boom"));
/// assert!(!failed.is_success());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    /// Request identifier this response corresponds to
    pub id: RequestId,
    /// Encoded response record (present on success)
    pub payload: Option<Payload>,
    /// Error status (present on failure)
    pub status: Option<Status>,
}

impl Response {
    pub fn success(id: RequestId, payload: Payload) -> Self {
        Response {
            id,
            payload: Some(payload),
            status: None,
        }
    }

    pub fn failure(id: RequestId, status: Status) -> Self {
        Response {
            id,
            payload: None,
            status: Some(status),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_none() && self.payload.is_some()
    }

    /// Consumes the response, yielding the payload or the remote error.
    pub fn into_result(self) -> Result<Payload, RpcError> {
        match (self.payload, self.status) {
            (_, Some(status)) => Err(status.into_error()),
            (Some(payload), None) => Ok(payload),
            (None, None) => Err(RpcError::MalformedMessage(
                "Response carries neither payload nor status".to_string(),
            )),
        }
    }
}
