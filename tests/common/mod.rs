//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock backend does with one request.
#[allow(dead_code)]
pub enum Reply {
    /// Respond with a status and body after an optional delay.
    Respond { status: u16, body: String, delay: Duration },
    /// Accept the connection and never answer.
    Hang,
}

#[allow(dead_code)]
impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Respond { status: 200, body: body.to_string(), delay: Duration::ZERO }
    }

    pub fn status(status: u16) -> Self {
        Reply::Respond { status, body: "{}".to_string(), delay: Duration::ZERO }
    }

    pub fn slow(delay: Duration) -> Self {
        Reply::Respond { status: 200, body: "{}".to_string(), delay }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Read until the end of the request headers so closing the socket does not reset the client.
async fn drain_request(socket: &mut TcpStream) {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 512];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    return;
                }
            }
        }
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        drain_request(&mut socket).await;
                        match f().await {
                            Reply::Respond { status, body, delay } => {
                                tokio::time::sleep(delay).await;
                                let response = format!(
                                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status,
                                    reason(status),
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            Reply::Hang => {
                                tokio::time::sleep(Duration::from_secs(60)).await;
                                drop(socket);
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A backend that always answers 200 with `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { Reply::ok(body) }).await
}

/// A backend that accepts connections and never responds.
#[allow(dead_code)]
pub async fn start_hanging_backend() -> SocketAddr {
    start_programmable_backend(|| async { Reply::Hang }).await
}

#[allow(dead_code)]
pub fn health_url(addr: SocketAddr) -> String {
    format!("http://{}/health", addr)
}
