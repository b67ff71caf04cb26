//! CLI Integration Tests
//!
//! Runs the `unirpc` binary as a child process.
//!
//! Test Scenarios:
//! 1. Argument validation errors exit non-zero
//! 2. `call` against an unbound address fails
//! 3. `serve` followed by `call` prints the welcome message
//!
//! All addresses use `127.0.0.1` with an explicit port.

use std::process::{Child, Command, Output, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

// ============================================================================
// Test Helpers
// ============================================================================

fn unirpc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_unirpc"))
}

/// Returns a loopback port with nothing listening on it.
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Kills the child process when dropped.
struct ServerProcess(Child);

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_server(port: u16) -> ServerProcess {
    let child = unirpc()
        .args(["serve", "--host", "127.0.0.1", "--port", &port.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn unirpc serve");
    ServerProcess(child)
}

fn call(port: u16, name: &str) -> Output {
    unirpc()
        .args(["call", "--addr", &format!("127.0.0.1:{}", port), "--name", name])
        .env_remove("UNIRPC_ADDR")
        .env_remove("UNIRPC_NAME")
        .output()
        .expect("Failed to run unirpc call")
}

/// Retries `call` until the server accepts or the deadline passes.
fn call_when_ready(port: u16, name: &str) -> Output {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let output = call(port, name);
        if output.status.success() || Instant::now() > deadline {
            return output;
        }
        sleep(Duration::from_millis(100));
    }
}

// ============================================================================
// Argument Validation
// ============================================================================

#[test]
fn test_no_subcommand_fails() {
    let output = unirpc().output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_invalid_port_fails() {
    let output = unirpc().args(["serve", "--port", "not-a-port"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_invalid_addr_fails() {
    let output = unirpc().args(["call", "--addr", "no-port"]).output().unwrap();
    assert!(!output.status.success());
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_call_unbound_address_fails() {
    let output = call(free_port(), "nobody");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_serve_then_call_prints_welcome() {
    let port = free_port();
    let _server = spawn_server(port);

    let output = call_when_ready(port, "Lukman");
    assert!(
        output.status.success(),
        "call failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim_end(), "Welcome onboard Lukman");
}
