//! TCP Server for the welcome service
//!
//! # Architecture
//!
//! The server:
//! - Binds a TCP listener exclusively on the configured endpoint
//! - Spawns a tokio task for each accepted connection
//! - Handles exchanges on a connection one at a time: read a request frame,
//!   dispatch it to the bound [`WelcomeService`], write the response frame
//! - Stops accepting when its [`ShutdownHandle`] is triggered, releases the
//!   endpoint, and waits up to the drain timeout for in-flight exchanges
//!   before returning
//!
//! # Example
//!
//! ```no_run
//! use unirpc_server::{Greeter, WelcomeServer};
//!
//! #[tokio::main]
//! async fn main() -> unirpc_common::Result<()> {
//!     let endpoint = "0.0.0.0:50051".parse()?;
//!     let server = WelcomeServer::bind(&endpoint, Greeter::new()).await?;
//!     server.serve_with_shutdown(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await
//! }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;

use unirpc_common::protocol::error::{Result, RpcError};
use unirpc_common::protocol::{Endpoint, Response, Status, StatusCode};
use unirpc_common::service::{dispatch, WelcomeService};
use unirpc_common::transport::{read_frame, write_frame, JsonCodec, MAX_MESSAGE_SIZE};

/// Default bound on waiting for in-flight exchanges after a stop (30 seconds)
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before accepting again after the process ran out of resources
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound welcome server.
///
/// Holding this value holds the listening socket. [`serve`](Self::serve)
/// consumes it and releases the socket when it returns.
pub struct WelcomeServer<S> {
    listener: TcpListener,
    service: Arc<S>,
    shutdown: Arc<watch::Sender<bool>>,
    drain_timeout: Duration,
}

/// Stops a running [`WelcomeServer`]. Cheap to clone.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Signals the server to stop accepting and drain. Repeated calls are no-ops.
    pub fn stop(&self) {
        if !self.shutdown.send_replace(true) {
            tracing::info!("Shutdown requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl<S: WelcomeService> WelcomeServer<S> {
    /// Binds the endpoint for exclusive use by this server.
    ///
    /// # Errors
    ///
    /// Returns `EndpointUnavailable` if the address is already bound by another
    /// listener, cannot be resolved, or cannot be bound for any other reason.
    pub async fn bind(endpoint: &Endpoint, service: S) -> Result<Self> {
        let addr = endpoint.to_string();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::EndpointUnavailable {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            service: Arc::new(service),
            shutdown: Arc::new(shutdown),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        })
    }

    /// Sets how long a stop waits for in-flight exchanges before aborting them.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Gets the actual bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| RpcError::TransportFailure(format!("Failed to get local addr: {}", e)))
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Accepts connections until stopped.
    ///
    /// Returns `Ok(())` after a requested stop once every in-flight exchange
    /// has finished, or once the drain timeout has elapsed and the remaining
    /// exchanges were aborted. Returns `TransportFailure` if the listening
    /// socket itself fails; errors on a single connection only end that
    /// connection, and running out of file descriptors or memory only pauses
    /// accepting.
    pub async fn serve(self) -> Result<()> {
        let WelcomeServer {
            listener,
            service,
            shutdown,
            drain_timeout,
        } = self;

        let mut stop_rx = shutdown.subscribe();
        let local_addr = listener
            .local_addr()
            .map_err(|e| RpcError::TransportFailure(format!("Failed to get local addr: {}", e)))?;
        tracing::info!("Server listening at {}", local_addr);

        let mut connections = JoinSet::new();

        let outcome = loop {
            tokio::select! {
                _ = stopped(&mut stop_rx) => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        tracing::debug!("Connection established from {}", peer_addr);
                        let service = service.clone();
                        let stop_rx = shutdown.subscribe();
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, service, stop_rx).await {
                                tracing::warn!("Connection error from {}: {}", peer_addr, e);
                            }
                        });
                    }
                    Err(e) if is_connection_error(&e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                    Err(e) if is_resource_exhausted(&e) => {
                        tracing::warn!(
                            "Failed to accept connection: {}, retrying in {}ms",
                            e,
                            ACCEPT_BACKOFF.as_millis()
                        );
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                    Err(e) => {
                        tracing::error!("Listener failed: {}", e);
                        break Err(RpcError::TransportFailure(format!("Failed to accept connection: {}", e)));
                    }
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Connection task failed: {}", e);
                    }
                }
            }
        };

        // Release the endpoint before draining so a new server can bind it
        drop(listener);
        shutdown.send_replace(true);

        if !connections.is_empty() {
            tracing::info!("Draining {} connection(s)", connections.len());
        }
        let drained = tokio::time::timeout(drain_timeout, async {
            while let Some(joined) = connections.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Connection task failed: {}", e);
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                "Drain timed out after {}ms, aborting {} connection(s)",
                drain_timeout.as_millis(),
                connections.len()
            );
            connections.abort_all();
            while connections.join_next().await.is_some() {}
        }

        tracing::info!("Server at {} stopped", local_addr);
        outcome
    }

    /// Runs [`serve`](Self::serve) and stops it when `signal` completes.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.shutdown_handle();
        let serve = self.serve();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result,
            _ = signal => {
                handle.stop();
                serve.await
            }
        }
    }
}

/// Resolves once a stop has been signalled or every handle is gone.
async fn stopped(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stopped| *stopped).await;
}

/// Errors that concern only the connection being accepted.
fn is_connection_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::Interrupted
    )
}

/// Errors that mean the process is out of descriptors, buffers or memory.
/// The listening socket is still healthy.
fn is_resource_exhausted(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::OutOfMemory || is_os_resource_error(err)
}

#[cfg(unix)]
fn is_os_resource_error(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EMFILE) | Some(libc::ENFILE) | Some(libc::ENOBUFS) | Some(libc::ENOMEM)
    )
}

#[cfg(not(unix))]
fn is_os_resource_error(_err: &std::io::Error) -> bool {
    false
}

/// Encodes a reply, substituting an `Internal` failure when it does not fit
/// in one frame of `limit` bytes.
fn encode_reply(response: &Response, limit: usize) -> Result<Vec<u8>> {
    let encoded = JsonCodec::encode_response(response)?;
    if encoded.len() <= limit {
        return Ok(encoded);
    }

    tracing::warn!(
        "Response {} is {} bytes, over the {} byte frame limit",
        response.id,
        encoded.len(),
        limit
    );
    let status = Status::new(
        StatusCode::Internal,
        format!("Response of {} bytes exceeds the {} byte frame limit", encoded.len(), limit),
    );
    JsonCodec::encode_response(&Response::failure(response.id, status))
}

/// Handle a single TCP connection
///
/// Processes sequential exchanges until the peer closes the connection or
/// the server stops. A stop abandons a request frame that has not fully
/// arrived. Once a request has been read, its exchange runs to completion.
async fn handle_connection<S: WelcomeService>(
    mut stream: TcpStream,
    service: Arc<S>,
    mut stop_rx: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let frame = tokio::select! {
            biased;
            frame = read_frame(&mut stream) => frame?,
            _ = stopped(&mut stop_rx) => {
                tracing::debug!("Closing connection on shutdown");
                return Ok(());
            }
        };

        let data = match frame {
            Some(data) => data,
            None => {
                tracing::debug!("Connection closed by peer");
                return Ok(());
            }
        };

        let response = match JsonCodec::decode_request(&data) {
            Ok(request) => {
                tracing::debug!("Handling request {} for method: {}", request.id, request.method);
                dispatch(service.as_ref(), request).await
            }
            Err(e) => {
                // The frame was intact, so the stream stays usable
                tracing::warn!("Failed to decode request: {}", e);
                Response::failure(0, Status::from(&e))
            }
        };

        let encoded = encode_reply(&response, MAX_MESSAGE_SIZE)?;
        write_frame(&mut stream, &encoded).await?;
    }
}
