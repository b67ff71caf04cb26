//! # unirpc CLI Entry Point
//!
//! Main binary for the unirpc welcome service.
//!
//! ## Usage
//!
//! ```bash
//! # Start the greeter on the default port (50051)
//! unirpc serve
//!
//! # Start on a specific interface and port
//! unirpc serve --host 127.0.0.1 --port 6000
//!
//! # Send one welcome request
//! unirpc call --addr localhost:50051 --name Lukman
//! ```
//!
//! ## Environment
//!
//! `UNIRPC_HOST`, `UNIRPC_PORT`, `UNIRPC_ADDR` and `UNIRPC_NAME` are used when
//! the matching flag is absent. `RUST_LOG` controls log verbosity.

use anyhow::Result;
use argh::FromArgs;

use unirpc_cli::config::{CallConfig, ServeConfig};
use unirpc_client::Connection;
use unirpc_common::WelcomeRequest;
use unirpc_server::{Greeter, WelcomeServer};

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// unirpc - unary welcome service
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
///
/// - **Serve**: Run the greeter server until interrupted
/// - **Call**: Make a single `SendWelcome` call
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Call(CallArgs),
}

/// Arguments for starting the greeter server.
///
/// # Example
///
/// ```bash
/// unirpc serve -p 50051
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start the welcome server
struct ServeArgs {
    /// interface to listen on
    ///
    /// Falls back to UNIRPC_HOST, then "0.0.0.0".
    #[argh(option, long = "host")]
    host: Option<String>,

    /// the server port
    ///
    /// Falls back to UNIRPC_PORT, then 50051. Port 0 picks a free port; the
    /// bound address is logged at startup.
    #[argh(option, short = 'p', long = "port")]
    port: Option<u16>,
}

/// Arguments for making a single welcome call.
///
/// The reply message is printed to stdout; logs go to stderr.
///
/// # Example
///
/// ```bash
/// unirpc call -a 127.0.0.1:50051 -n Lukman
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// send a welcome request
struct CallArgs {
    /// the address to connect to, as host:port
    ///
    /// Falls back to UNIRPC_ADDR, then "localhost:50051".
    #[argh(option, short = 'a', long = "addr")]
    addr: Option<String>,

    /// name to greet
    ///
    /// Falls back to UNIRPC_NAME, then "world". An empty name is allowed.
    #[argh(option, short = 'n', long = "name")]
    name: Option<String>,

    /// call timeout in milliseconds
    #[argh(option, long = "timeout-ms", default = "5000")]
    timeout_ms: u64,

    /// connection timeout in milliseconds
    #[argh(option, long = "connect-timeout-ms", default = "5000")]
    connect_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default to INFO, RUST_LOG overrides. Logs go to stderr so `call` output
    // stays pipeable.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Call(args) => run_call(args).await,
    }
}

/// Executes the `serve` subcommand.
///
/// Binds the endpoint, serves the default [`Greeter`] and stops gracefully
/// on ctrl-c.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ServeConfig::resolve(args.host, args.port)?;
    tracing::info!("Binding to: {}", config.endpoint);

    let server = WelcomeServer::bind(&config.endpoint, Greeter::new()).await?;
    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}

/// Executes the `call` subcommand.
///
/// The connection is closed whether or not the call succeeds.
///
/// # Errors
///
/// Returns an error if the address is invalid, the connection cannot be
/// opened, or the call fails or times out.
async fn run_call(args: CallArgs) -> Result<()> {
    let config = CallConfig::resolve(args.addr, args.name, args.connect_timeout_ms, args.timeout_ms)?;

    let mut connection = Connection::connect(&config.endpoint, config.connect_timeout).await?;
    let result = connection
        .call(&WelcomeRequest::new(config.name), config.call_timeout)
        .await;
    connection.close().await;

    let response = result?;
    tracing::info!("Greeting: {}", response.message);
    println!("{}", response.message);

    Ok(())
}

/// CLI argument parsing tests.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let args: Cli = Cli::from_args(&["unirpc"], &["serve"]).unwrap();
        match args.command {
            Commands::Serve(ServeArgs { host, port }) => {
                assert!(host.is_none());
                assert!(port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let args: Cli = Cli::from_args(&["unirpc"], &["serve", "-p", "6000", "--host", "127.0.0.1"]).unwrap();
        match args.command {
            Commands::Serve(ServeArgs { host, port }) => {
                assert_eq!(host, Some("127.0.0.1".to_string()));
                assert_eq!(port, Some(6000));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_rejects_bad_port() {
        assert!(Cli::from_args(&["unirpc"], &["serve", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_cli_parse_call_defaults() {
        let args: Cli = Cli::from_args(&["unirpc"], &["call"]).unwrap();
        match args.command {
            Commands::Call(CallArgs { addr, name, timeout_ms, connect_timeout_ms }) => {
                assert!(addr.is_none());
                assert!(name.is_none());
                assert_eq!(timeout_ms, 5000); // default
                assert_eq!(connect_timeout_ms, 5000); // default
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_with_args() {
        let args: Cli = Cli::from_args(&["unirpc"], &[
            "call",
            "-a", "127.0.0.1:50051",
            "--name", "Lukman",
            "--timeout-ms", "250",
        ]).unwrap();
        match args.command {
            Commands::Call(CallArgs { addr, name, timeout_ms, .. }) => {
                assert_eq!(addr, Some("127.0.0.1:50051".to_string()));
                assert_eq!(name, Some("Lukman".to_string()));
                assert_eq!(timeout_ms, 250);
            }
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_parse_call_empty_name() {
        let args: Cli = Cli::from_args(&["unirpc"], &["call", "-n", ""]).unwrap();
        match args.command {
            Commands::Call(CallArgs { name, .. }) => assert_eq!(name, Some(String::new())),
            _ => panic!("Expected Call command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::from_args(&["unirpc"], &["node"]).is_err());
    }
}
