//! Accept Loop Under Descriptor Exhaustion
//!
//! Lowers `RLIMIT_NOFILE` for the whole process, so it lives in its own test
//! binary and holds a single test.

#![cfg(unix)]

use std::time::Duration;

use tokio::net::TcpStream;

use unirpc_client::WelcomeClient;
use unirpc_common::Endpoint;
use unirpc_server::{Greeter, WelcomeServer};

/// Sets the soft open-file limit and returns the previous one.
fn set_open_file_limit(soft: libc::rlim_t) -> libc::rlim_t {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    assert_eq!(unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) }, 0);

    let previous = limit.rlim_cur;
    limit.rlim_cur = soft.min(limit.rlim_max);
    assert_eq!(unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limit) }, 0);
    previous
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_serve_survives_descriptor_exhaustion() {
    let server = WelcomeServer::bind(&Endpoint::new("127.0.0.1", 0), Greeter).await.unwrap();
    let endpoint = Endpoint::from(server.local_addr().unwrap());
    let handle = server.shutdown_handle();
    let task = tokio::spawn(server.serve());

    // Each loopback connection costs two descriptors in this process, so the
    // table fills up on both sides of the accept
    let previous = set_open_file_limit(64);
    let mut clients = Vec::new();
    let mut refused = 0;
    for _ in 0..128 {
        match TcpStream::connect(endpoint.to_string()).await {
            Ok(stream) => clients.push(stream),
            Err(_) => refused += 1,
        }
    }
    // Let the accept loop run into the limit a few times
    tokio::time::sleep(Duration::from_millis(500)).await;

    let survived = !task.is_finished();
    drop(clients);
    set_open_file_limit(previous);

    assert!(refused > 0, "descriptor limit was never reached");
    assert!(survived, "serve ended while descriptors were exhausted");

    let client = WelcomeClient::connect(&endpoint).await.unwrap();
    let message = tokio::time::timeout(Duration::from_secs(5), client.welcome("after"))
        .await
        .expect("server stopped answering after descriptor exhaustion")
        .unwrap();
    assert_eq!(message, "Welcome onboard after");
    client.close().await;

    handle.stop();
    let result = tokio::time::timeout(Duration::from_secs(5), task).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}
