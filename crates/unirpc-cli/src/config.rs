//! Process configuration for the `unirpc` binary.
//!
//! Every setting resolves in the same order: command-line flag, then
//! environment variable, then built-in default.

use std::time::Duration;

use anyhow::{Context, Result};
use unirpc_common::Endpoint;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_ADDR: &str = "localhost:50051";
pub const DEFAULT_NAME: &str = "world";

pub const ENV_HOST: &str = "UNIRPC_HOST";
pub const ENV_PORT: &str = "UNIRPC_PORT";
pub const ENV_ADDR: &str = "UNIRPC_ADDR";
pub const ENV_NAME: &str = "UNIRPC_NAME";

/// Settings for `unirpc serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub endpoint: Endpoint,
}

impl ServeConfig {
    pub fn resolve(host: Option<String>, port: Option<u16>) -> Result<Self> {
        Self::resolve_with(host, port, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(host: Option<String>, port: Option<u16>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = host
            .or_else(|| env(ENV_HOST))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match port {
            Some(port) => port,
            None => match env(ENV_PORT) {
                Some(raw) => raw
                    .parse::<u16>()
                    .with_context(|| format!("Invalid {} '{}'", ENV_PORT, raw))?,
                None => DEFAULT_PORT,
            },
        };

        Ok(Self {
            endpoint: Endpoint::new(host, port),
        })
    }
}

/// Settings for `unirpc call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallConfig {
    pub endpoint: Endpoint,
    pub name: String,
    pub connect_timeout: Duration,
    pub call_timeout: Duration,
}

impl CallConfig {
    pub fn resolve(
        addr: Option<String>,
        name: Option<String>,
        connect_timeout_ms: u64,
        call_timeout_ms: u64,
    ) -> Result<Self> {
        Self::resolve_with(addr, name, connect_timeout_ms, call_timeout_ms, |key| {
            std::env::var(key).ok()
        })
    }

    pub fn resolve_with<F>(
        addr: Option<String>,
        name: Option<String>,
        connect_timeout_ms: u64,
        call_timeout_ms: u64,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = addr
            .or_else(|| env(ENV_ADDR))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let endpoint: Endpoint = addr
            .parse()
            .with_context(|| format!("Invalid target address '{}'", addr))?;

        // Empty names are kept; only a missing name falls back
        let name = name
            .or_else(|| env(ENV_NAME))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        Ok(Self {
            endpoint,
            name,
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            call_timeout: Duration::from_millis(call_timeout_ms),
        })
    }
}
