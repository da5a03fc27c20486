//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use http_daemon::config::vhost::parse_virtual_hosts;
use http_daemon::http::framer::{read_frame, Missing};
use http_daemon::http::{ConnectionHandler, ContentRoots};
use http_daemon::lifecycle::{start_role, Shutdown};
use http_daemon::load_balancer::BackendPool;
use http_daemon::routing::{ProxyRouter, RouteTable};
use http_daemon::{Application, ProxyHandler};

/// A mock backend that answers every request with its own name.
pub struct MockBackend {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a backend on an ephemeral port; its body is `name`.
pub async fn start_mock_backend(name: &'static str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let _ = read_frame(&mut socket, Missing::Empty).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    name.len(),
                    name
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockBackend { addr, connections }
}

/// Run `handler` on an ephemeral port until `shutdown` fires.
pub fn spawn_role<H: ConnectionHandler>(name: &'static str, handler: H, shutdown: &Shutdown) -> SocketAddr {
    let (addr, _task) = start_role(name, "127.0.0.1:0".parse().unwrap(), handler, shutdown).unwrap();
    addr
}

/// Run a proxy configured from virtual-host file text.
pub fn spawn_proxy(vhosts: &str, shutdown: &Shutdown) -> SocketAddr {
    let pool = BackendPool::from_config(parse_virtual_hosts(vhosts).unwrap());
    spawn_role("proxy", ProxyHandler::new(ProxyRouter::new(pool)), shutdown)
}

/// Run an application serving `routes` and the files under `base`.
pub fn spawn_app(routes: RouteTable, base: &Path, shutdown: &Shutdown) -> SocketAddr {
    spawn_role("application", Application::new(routes, ContentRoots::new(base)), shutdown)
}

/// A content directory with one page, one stylesheet and one image.
pub fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    fs::create_dir_all(base.join("www")).unwrap();
    fs::create_dir_all(base.join("static/css")).unwrap();
    fs::create_dir_all(base.join("static/images")).unwrap();
    fs::write(base.join("www/index.html"), "<html><body>tracker</body></html>").unwrap();
    fs::write(base.join("static/css/styles.css"), "body { color: #333; }").unwrap();
    fs::write(base.join("static/images/logo.png"), PNG).unwrap();
    dir
}

/// Bytes of a tiny PNG, including non-UTF-8 values.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0xff, 0xfe, 0x80,
];
