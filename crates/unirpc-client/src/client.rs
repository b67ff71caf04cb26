use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use unirpc_common::protocol::error::Result;
use unirpc_common::protocol::{Endpoint, WelcomeRequest, WelcomeResponse};
use unirpc_common::service::WelcomeService;

use crate::connection::{Connection, ConnectionState, DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};

/// Welcome service stub.
///
/// Presents `SendWelcome` as a local call over one [`Connection`]. Calls made
/// through a shared stub are serialized on that connection; open one stub per
/// task for parallel calls.
///
/// The stub implements [`WelcomeService`], so it can be bound to a server as a
/// forwarding service.
pub struct WelcomeClient {
    connection: Mutex<Connection>,
    call_timeout: Duration,
}

impl WelcomeClient {
    /// Connect with the default connect and call timeouts
    pub async fn connect(endpoint: &Endpoint) -> Result<Self> {
        Self::connect_with_timeout(endpoint, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn connect_with_timeout(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Self> {
        let connection = Connection::connect(endpoint, connect_timeout).await?;
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Sends `name` and returns the welcome message.
    pub async fn welcome(&self, name: impl Into<String>) -> Result<String> {
        let response = self.send_welcome(WelcomeRequest::new(name)).await?;
        Ok(response.message)
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.lock().await.state()
    }

    pub async fn close(&self) {
        self.connection.lock().await.close().await;
    }
}

#[async_trait]
impl WelcomeService for WelcomeClient {
    async fn send_welcome(&self, request: WelcomeRequest) -> Result<WelcomeResponse> {
        let mut connection = self.connection.lock().await;
        connection.call(&request, self.call_timeout).await
    }
}
