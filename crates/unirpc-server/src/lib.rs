//! unirpc Server
//!
//! This crate binds a [`WelcomeService`](unirpc_common::service::WelcomeService)
//! implementation to a TCP endpoint and provides the default [`Greeter`].

pub mod greeter;
pub mod server;

pub use greeter::{Greeter, WELCOME_PREFIX};
pub use server::{ShutdownHandle, WelcomeServer};
