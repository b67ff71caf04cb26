use std::fmt;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use unirpc_common::protocol::error::{Result, RpcError};
use unirpc_common::protocol::{Endpoint, Payload, Request, WelcomeRequest, WelcomeResponse, SEND_WELCOME};
use unirpc_common::transport::{read_response, write_request, JsonCodec};

/// Default bound on connection establishment (5 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on a single call (5 seconds)
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of a [`Connection`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unopened,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Unopened => "unopened",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Client-held connection to one server endpoint.
///
/// Carries any number of sequential unary calls. The socket is released by
/// [`close`](Self::close), when an exchange leaves the stream unusable, or
/// when the value is dropped.
///
/// # Example
///
/// ```no_run
/// use unirpc_client::Connection;
/// use unirpc_common::WelcomeRequest;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let endpoint = "127.0.0.1:50051".parse()?;
/// let mut connection = Connection::connect(&endpoint, Duration::from_secs(1)).await?;
///
/// let response = connection
///     .call(&WelcomeRequest::new("Lukman"), Duration::from_secs(1))
///     .await?;
/// assert_eq!(response.message, "Welcome onboard Lukman");
///
/// connection.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    endpoint: Endpoint,
    stream: Option<TcpStream>,
    state: ConnectionState,
}

impl Connection {
    /// Creates an unopened connection to `endpoint`.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            stream: None,
            state: ConnectionState::Unopened,
        }
    }

    /// Creates and opens a connection in one step.
    pub async fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let mut connection = Self::new(endpoint.clone());
        connection.open(timeout).await?;
        Ok(connection)
    }

    /// Opens the connection.
    ///
    /// `timeout` bounds only the TCP handshake. Opening an open connection is
    /// a no-op. A failed attempt leaves the connection unopened.
    ///
    /// # Errors
    ///
    /// - `ConnectionFailed` if the endpoint refuses, cannot be resolved, or
    ///   the timeout elapses first
    /// - `ConnectionClosed` if the connection was already closed
    pub async fn open(&mut self, timeout: Duration) -> Result<()> {
        match self.state {
            ConnectionState::Open => return Ok(()),
            ConnectionState::Closed => return Err(RpcError::ConnectionClosed),
            ConnectionState::Unopened => {}
        }

        let addr = self.endpoint.to_string();
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(RpcError::ConnectionFailed {
                    addr,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(RpcError::ConnectionFailed {
                    addr,
                    reason: format!("timed out after {}ms", timeout.as_millis()),
                })
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY on {}: {}", addr, e);
        }

        tracing::debug!("Connected to {}", addr);
        self.stream = Some(stream);
        self.state = ConnectionState::Open;
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Calls `SendWelcome`.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke). A reply payload that does not decode
    /// into a [`WelcomeResponse`] is `CallFailed(MalformedMessage)` and closes
    /// the connection.
    pub async fn call(&mut self, request: &WelcomeRequest, timeout: Duration) -> Result<WelcomeResponse> {
        let payload = JsonCodec::encode_message(request).map_err(RpcError::call_failed)?;
        let reply = self.invoke(SEND_WELCOME, payload, timeout).await?;
        match JsonCodec::decode_message(reply) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::debug!("Undecodable reply from {}: {}", self.endpoint, e);
                self.abandon();
                Err(RpcError::call_failed(e))
            }
        }
    }

    /// Performs one unary exchange for `method`.
    ///
    /// `timeout` runs from the moment this is called until the reply is
    /// decoded. No retry is attempted.
    ///
    /// # Errors
    ///
    /// - `CallTimeout` if no reply arrives in time. The connection closes:
    ///   a late reply would otherwise be read by the next call.
    /// - `CallFailed(Io | MalformedMessage | ConnectionClosed)` if the
    ///   exchange broke the stream. The connection closes.
    /// - `CallFailed(NotImplemented | MalformedMessage | Remote)` if the
    ///   server answered with an error status. The connection stays open.
    /// - `CallFailed(NotConnected | ConnectionClosed)` if the connection is
    ///   not open.
    pub async fn invoke(&mut self, method: &str, payload: Payload, timeout: Duration) -> Result<Payload> {
        let stream = match (self.state, self.stream.as_mut()) {
            (ConnectionState::Open, Some(stream)) => stream,
            (ConnectionState::Unopened, _) => return Err(RpcError::call_failed(RpcError::NotConnected)),
            _ => return Err(RpcError::call_failed(RpcError::ConnectionClosed)),
        };

        let request = Request::new(method, payload);
        let request_id = request.id;

        let exchange = async {
            write_request(stream, &request).await?;
            read_response(stream).await
        };

        let response = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::debug!("Call {} on {} failed: {}", request_id, self.endpoint, e);
                self.abandon();
                return Err(RpcError::call_failed(e));
            }
            Err(_) => {
                tracing::debug!("Call {} on {} timed out", request_id, self.endpoint);
                self.abandon();
                return Err(RpcError::CallTimeout(timeout));
            }
        };

        // Id 0 is the server's answer to a request it could not read
        let unreadable_request = response.id == 0 && response.status.is_some();
        if response.id != request_id && !unreadable_request {
            self.abandon();
            return Err(RpcError::call_failed(RpcError::MalformedMessage(format!(
                "Response id {} does not match request id {}",
                response.id, request_id
            ))));
        }

        response.into_result().map_err(RpcError::call_failed)
    }

    /// Closes the connection. Later calls are no-ops.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::debug!("Error shutting down connection to {}: {}", self.endpoint, e);
            }
            tracing::debug!("Closed connection to {}", self.endpoint);
        }
        self.state = ConnectionState::Closed;
    }

    /// Drops the stream without a graceful shutdown.
    fn abandon(&mut self) {
        self.stream = None;
        self.state = ConnectionState::Closed;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint.to_string())
            .field("state", &self.state)
            .finish()
    }
}
