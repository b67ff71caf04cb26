use async_trait::async_trait;
use unirpc_common::service::WelcomeService;
use unirpc_common::{Result, WelcomeRequest, WelcomeResponse};

/// Text every welcome message starts with.
pub const WELCOME_PREFIX: &str = "Welcome onboard ";

/// Default welcome service.
///
/// Replies `"Welcome onboard " + name` for every name, including the empty
/// one. Holds no state, so one instance serves any number of connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct Greeter;

impl Greeter {
    pub fn new() -> Self {
        Greeter
    }

    pub fn greet(name: &str) -> String {
        format!("{}{}", WELCOME_PREFIX, name)
    }
}

#[async_trait]
impl WelcomeService for Greeter {
    async fn send_welcome(&self, request: WelcomeRequest) -> Result<WelcomeResponse> {
        tracing::info!("Received: {}", request.name);
        Ok(WelcomeResponse::new(Self::greet(&request.name)))
    }
}
