//! unirpc Common Types and Transport
//!
//! This crate provides the message codec, the service contract and the wire
//! framing shared by the unirpc server and client.
//!
//! # Overview
//!
//! unirpc exposes one unary remote procedure, `SendWelcome`, over TCP:
//!
//! - **Protocol Layer**: the welcome records, request/response envelopes,
//!   endpoints and the error taxonomy
//! - **Service Layer**: the [`WelcomeService`](service::WelcomeService) trait
//!   and the method dispatcher
//! - **Transport Layer**: JSON codec and length-prefixed framing
//!
//! # Architecture
//!
//! - **Transport**: TCP, one request and one response per exchange, several
//!   sequential exchanges per connection
//! - **Serialization**: JSON
//! - **Message Format**: `[4-byte length prefix as u32 big-endian] + [JSON data]`
//!
//! # Example
//!
//! ```
//! use unirpc_common::{Request, Response, WelcomeRequest, SEND_WELCOME};
//! use unirpc_common::transport::JsonCodec;
//!
//! let payload = JsonCodec::encode_message(&WelcomeRequest::new("Lukman")).unwrap();
//! let request = Request::new(SEND_WELCOME, payload);
//!
//! let response = Response::success(request.id, serde_json::json!({"message": "Welcome onboard Lukman"}));
//! assert!(response.is_success());
//! ```

pub mod protocol;
pub mod service;
pub mod transport;

pub use protocol::*;
