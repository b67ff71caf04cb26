//! Welcome Service Contract
//!
//! The transport-independent interface of the welcome service and the
//! dispatch function that routes a decoded request envelope to it.
//!
//! Implementors override the operations they support. Every operation has
//! a default body that fails with [`RpcError::NotImplemented`], so adding an
//! operation to the contract does not break existing implementations.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use unirpc_common::service::WelcomeService;
//! use unirpc_common::{Result, WelcomeRequest, WelcomeResponse};
//!
//! struct Shouter;
//!
//! #[async_trait]
//! impl WelcomeService for Shouter {
//!     async fn send_welcome(&self, request: WelcomeRequest) -> Result<WelcomeResponse> {
//!         Ok(WelcomeResponse::new(request.name.to_uppercase()))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::protocol::error::{Result, RpcError};
use crate::protocol::{Request, Response, Status, WelcomeRequest, WelcomeResponse, SEND_WELCOME};
use crate::transport::JsonCodec;

/// Server-side plugin for the welcome service.
///
/// The same value may be invoked concurrently from many connections.
#[async_trait]
pub trait WelcomeService: Send + Sync + 'static {
    async fn send_welcome(&self, _request: WelcomeRequest) -> Result<WelcomeResponse> {
        Err(RpcError::NotImplemented(SEND_WELCOME.to_string()))
    }
}

#[async_trait]
impl<S: WelcomeService + ?Sized> WelcomeService for std::sync::Arc<S> {
    async fn send_welcome(&self, request: WelcomeRequest) -> Result<WelcomeResponse> {
        (**self).send_welcome(request).await
    }
}

/// Routes one request envelope to `service` and builds the reply envelope.
///
/// Unknown method names fall back to a `NotImplemented` status. The reply
/// always carries the request's id.
pub async fn dispatch<S>(service: &S, request: Request) -> Response
where
    S: WelcomeService + ?Sized,
{
    let id = request.id;
    let result = match request.method.as_str() {
        SEND_WELCOME => call_send_welcome(service, request).await,
        other => Err(RpcError::NotImplemented(other.to_string())),
    };

    match result {
        Ok(payload) => Response::success(id, payload),
        Err(e) => {
            tracing::debug!("Request {} failed: {}", id, e);
            Response::failure(id, Status::from(&e))
        }
    }
}

async fn call_send_welcome<S>(service: &S, request: Request) -> Result<serde_json::Value>
where
    S: WelcomeService + ?Sized,
{
    let input: WelcomeRequest = JsonCodec::decode_message(request.payload)?;
    let output = service.send_welcome(input).await?;
    JsonCodec::encode_message(&output)
}
