use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::protocol::error::Result;
use crate::protocol::{Payload, Request, Response};

/// JSON codec for envelopes and the records they carry.
///
/// Envelopes travel as raw bytes inside a frame. Records (such as
/// [`WelcomeRequest`](crate::protocol::WelcomeRequest)) travel as the
/// envelope's JSON `payload`. Every decode failure, whether invalid JSON, a
/// missing or extra field, a wrong type or a truncated buffer, is reported
/// as [`RpcError::MalformedMessage`](crate::RpcError::MalformedMessage).
///
/// # Example
///
/// ```
/// use unirpc_common::transport::JsonCodec;
/// use unirpc_common::protocol::WelcomeRequest;
///
/// let request = WelcomeRequest::new("Ada");
/// let payload = JsonCodec::encode_message(&request).unwrap();
/// let decoded: WelcomeRequest = JsonCodec::decode_message(payload).unwrap();
/// assert_eq!(request, decoded);
/// ```
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(request)?)
    }

    pub fn decode_request(data: &[u8]) -> Result<Request> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(response)?)
    }

    pub fn decode_response(data: &[u8]) -> Result<Response> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Encode a record into an envelope payload.
    ///
    /// Never fails for the records in [`protocol`](crate::protocol): they are
    /// plain structs of strings.
    pub fn encode_message<T: Serialize>(message: &T) -> Result<Payload> {
        Ok(serde_json::to_value(message)?)
    }

    /// Decode an envelope payload into a record.
    pub fn decode_message<T: DeserializeOwned>(payload: Payload) -> Result<T> {
        Ok(serde_json::from_value(payload)?)
    }
}
