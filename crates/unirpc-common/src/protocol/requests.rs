use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

pub type RequestId = u64;
pub type MethodName = String;
pub type Payload = serde_json::Value;

/// Fully qualified name of the one operation the welcome service exposes.
pub const SEND_WELCOME: &str = "unirpc.WelcomeService/SendWelcome";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Request envelope: one unary call on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub method: MethodName,
    pub payload: Payload,
}

impl Request {
    pub fn new(method: impl Into<String>, payload: Payload) -> Self {
        Request {
            id: generate_request_id(),
            method: method.into(),
            payload,
        }
    }
}

fn generate_request_id() -> RequestId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst);

    // Upper 32 bits from the clock, lower 32 bits from the counter
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}
