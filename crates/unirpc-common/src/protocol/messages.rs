//! Welcome Service Records
//!
//! The two flat records exchanged by the `SendWelcome` operation. They are
//! carried as the `payload` of the [`Request`](super::Request) and
//! [`Response`](super::Response) envelopes.

use serde::{Deserialize, Serialize};

/// Input of `SendWelcome`.
///
/// `name` may be empty; an empty name is valid input. No length limit is
/// applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WelcomeRequest {
    pub name: String,
}

impl WelcomeRequest {
    pub fn new(name: impl Into<String>) -> Self {
        WelcomeRequest { name: name.into() }
    }
}

/// Output of `SendWelcome`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WelcomeResponse {
    pub message: String,
}

impl WelcomeResponse {
    pub fn new(message: impl Into<String>) -> Self {
        WelcomeResponse {
            message: message.into(),
        }
    }
}
