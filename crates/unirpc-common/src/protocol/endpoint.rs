use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use super::error::RpcError;

/// Network address a server listens on, written `host:port`.
///
/// IPv6 hosts are written in brackets (`[::1]:50051`); the brackets are not
/// part of [`host`](Endpoint::host).
///
/// ```
/// use unirpc_common::Endpoint;
///
/// let endpoint: Endpoint = "127.0.0.1:50051".parse().unwrap();
/// assert_eq!(endpoint.port(), 50051);
/// assert_eq!(endpoint.to_string(), "127.0.0.1:50051");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .map(str::to_string)
            .unwrap_or(host);
        Endpoint { host, port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| RpcError::InvalidEndpoint(s.to_string()))?;

        if host.is_empty() {
            return Err(RpcError::InvalidEndpoint(s.to_string()));
        }
        // An unbracketed host with colons is an IPv6 literal missing its brackets
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            return Err(RpcError::InvalidEndpoint(s.to_string()));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| RpcError::InvalidEndpoint(s.to_string()))?;

        Ok(Endpoint::new(host, port))
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Endpoint::new(addr.ip().to_string(), addr.port())
    }
}
