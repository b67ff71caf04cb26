pub mod client;
pub mod connection;

pub use client::WelcomeClient;
pub use connection::{Connection, ConnectionState, DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
