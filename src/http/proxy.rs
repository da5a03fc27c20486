//! Proxy role: forward each request to the backend its host maps to.
//!
//! # Data Flow
//! ```text
//! frame (Content-Length body) ── incomplete → drop
//!     → Host header (lowercased, "unknown" when absent)
//!     → ProxyRouter::resolve ── none → 404, no outbound connection
//!     → connect backend, write the request bytes as received
//!     → read the backend reply until it closes
//!     → relay verbatim ── backend unreachable or silent → 404
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::framer::{read_frame, Frame, FrameError, Missing};
use crate::http::response::Reply;
use crate::http::server::ConnectionHandler;
use crate::load_balancer::Endpoint;
use crate::net::ConnectionError;
use crate::observability::metrics;
use crate::routing::{hostname_of, ProxyRouter};

pub const ROLE: &str = "proxy";

/// Error type for one forwarding attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("cannot connect to backend {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        source: std::io::Error,
    },

    #[error("failed to send request to backend: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to read backend reply: {0}")]
    Read(#[from] FrameError),

    #[error("backend closed the connection without replying")]
    EmptyReply,
}

/// Forward `frame` to `endpoint` and return the backend's raw reply.
pub async fn forward(endpoint: &Endpoint, frame: &Frame) -> Result<Vec<u8>, ForwardError> {
    let mut backend = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|source| ForwardError::Connect {
            endpoint: endpoint.clone(),
            source,
        })?;

    backend
        .write_all(&frame.to_bytes())
        .await
        .map_err(ForwardError::Write)?;

    let reply = read_frame(&mut backend, Missing::UntilClose).await?;
    if !reply.complete && reply.is_empty() {
        return Err(ForwardError::EmptyReply);
    }
    Ok(reply.to_bytes())
}

/// Reverse proxy connection handler.
#[derive(Debug, Clone)]
pub struct ProxyHandler {
    router: ProxyRouter,
}

impl ProxyHandler {
    pub fn new(router: ProxyRouter) -> Self {
        Self { router }
    }

    /// Resolve and forward one framed request.
    pub async fn respond(&self, frame: &Frame) -> Reply {
        let hostname = hostname_of(&frame.headers());

        let Some(endpoint) = self.router.resolve(&hostname) else {
            tracing::debug!(host = %hostname, "No backend for host");
            return Reply::not_found();
        };

        match forward(&endpoint, frame).await {
            Ok(bytes) => Reply {
                status: relayed_status(&bytes),
                bytes,
            },
            Err(e) => {
                tracing::error!(host = %hostname, backend = %endpoint, error = %e, "Backend unreachable");
                Reply::not_found()
            }
        }
    }

    async fn serve(&self, stream: &mut TcpStream) -> Result<(), ConnectionError> {
        let frame = read_frame(stream, Missing::Empty).await?;
        if !frame.complete {
            tracing::debug!(received = frame.head.len(), "Dropping connection without a request head");
            return Ok(());
        }

        let started = Instant::now();
        let reply = self.respond(&frame).await;
        stream
            .write_all(&reply.bytes)
            .await
            .map_err(ConnectionError::Write)?;

        metrics::record_request(ROLE, reply.status, started);
        tracing::info!(
            request = %frame.head.lines().next().unwrap_or_default(),
            status = reply.status,
            "Request proxied"
        );
        Ok(())
    }
}

impl ConnectionHandler for ProxyHandler {
    async fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = self.serve(&mut stream).await {
            tracing::warn!(peer_addr = %peer, error = %e, "Connection failed");
        }
        let _ = stream.shutdown().await;
    }
}

/// Status code from a relayed reply, for logs and metrics only; 0 when unreadable.
fn relayed_status(bytes: &[u8]) -> u16 {
    let line_end = bytes
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..line_end])
        .ok()
        .and_then(|line| line.split(' ').nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::vhost::parse_virtual_hosts;
    use crate::http::response::NOT_FOUND;
    use crate::load_balancer::BackendPool;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn frame(head: &str) -> Frame {
        Frame {
            head: head.to_string(),
            body: Vec::new(),
            complete: true,
        }
    }

    fn handler(vhosts: &str) -> ProxyHandler {
        let pool = BackendPool::from_config(parse_virtual_hosts(vhosts).unwrap());
        ProxyHandler::new(ProxyRouter::new(pool))
    }

    #[test]
    fn test_relayed_status() {
        assert_eq!(relayed_status(b"HTTP/1.1 201 Created\r\n\r\n"), 201);
        assert_eq!(relayed_status(b"HTTP/1.1 404"), 404);
        assert_eq!(relayed_status(b""), 0);
        assert_eq!(relayed_status(b"garbage"), 0);
    }

    #[tokio::test]
    async fn test_unknown_host_is_not_found() {
        let proxy = handler("host \"app.local\" { proxy_pass http://127.0.0.1:9; }");
        let reply = proxy.respond(&frame("GET / HTTP/1.1\r\nHost: other.local")).await;
        assert_eq!(reply.bytes, NOT_FOUND);

        let reply = proxy.respond(&frame("GET / HTTP/1.1")).await;
        assert_eq!(reply.status, 404);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_not_found() {
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = closed.local_addr().unwrap().port();
        drop(closed);

        let proxy = handler(&format!("host \"app.local\" {{ proxy_pass http://127.0.0.1:{port}; }}"));
        let reply = proxy.respond(&frame("GET / HTTP/1.1\r\nHost: app.local")).await;
        assert_eq!(reply.bytes, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_silent_backend_is_not_found() {
        let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = backend.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            for _ in 0..2 {
                let (mut conn, _) = backend.accept().await.unwrap();
                let _ = read_frame(&mut conn, Missing::Empty).await;
            }
        });

        let proxy = handler(&format!("host \"app.local\" {{ proxy_pass http://127.0.0.1:{port}; }}"));
        let reply = proxy.respond(&frame("GET / HTTP/1.1\r\nHost: app.local")).await;
        assert_eq!(reply.bytes, NOT_FOUND);

        let endpoint: Endpoint = format!("127.0.0.1:{port}").parse().unwrap();
        let err = forward(&endpoint, &frame("GET / HTTP/1.1")).await.unwrap_err();
        assert!(matches!(err, ForwardError::EmptyReply));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_forwards_verbatim_and_relays_reply() {
        let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = backend.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut conn, _) = backend.accept().await.unwrap();
            let received = read_frame(&mut conn, Missing::Empty).await.unwrap();
            conn.write_all(b"HTTP/1.1 200 OK\r\nX-Backend: one\r\n\r\nhello from backend")
                .await
                .unwrap();
            received
        });

        let proxy = handler(&format!("host \"App.Local\" {{ proxy_pass http://127.0.0.1:{port}; }}"));
        let request = Frame {
            head: "POST /submit HTTP/1.1\r\nHost: app.local\r\nContent-Length: 3".to_string(),
            body: b"a=b".to_vec(),
            complete: true,
        };
        let reply = proxy.respond(&request).await;

        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.bytes,
            b"HTTP/1.1 200 OK\r\nX-Backend: one\r\n\r\nhello from backend".to_vec()
        );

        let received = server.await.unwrap();
        assert_eq!(received, request);
    }

    #[tokio::test]
    async fn test_handler_writes_reply_to_client() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let proxy = handler("");

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET / HTTP/1.1\r\nHost: nowhere\r\n\r\n")
                .await
                .unwrap();
            let mut reply = Vec::new();
            stream.read_to_end(&mut reply).await.unwrap();
            reply
        });

        let (stream, peer) = listener.accept().await.unwrap();
        proxy.handle(stream, peer).await;
        assert_eq!(client.await.unwrap(), NOT_FOUND);
    }
}
