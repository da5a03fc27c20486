//! Application role: auth gate, route dispatch, static content.
//!
//! # Data Flow
//! ```text
//! frame (Content-Length body) ── incomplete → drop
//!     → Request::parse ── malformed → drop
//!     → AuthGate ── no session, not /login → 401
//!     → RouteTable (METHOD, path)
//!         - no handler        → static file
//!         - handler error     → 500
//!         - POST /login       → Accepted: Set-Cookie + /index.html, else 401
//!         - Rejected          → 401
//!         - Json(value)       → 200 application/json
//!         - Accepted/Continue → static file
//!     → write reply, close
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::content::ContentRoots;
use crate::http::framer::{read_frame, Missing};
use crate::http::request::{Request, DEFAULT_DOCUMENT};
use crate::http::response::{Reply, ResponseBuilder};
use crate::http::server::ConnectionHandler;
use crate::net::ConnectionError;
use crate::observability::metrics;
use crate::routing::{AuthGate, Outcome, RouteTable, SESSION_COOKIE};

pub const ROLE: &str = "application";

/// Serves a route table plus static content behind the auth gate.
#[derive(Debug, Clone)]
pub struct Application {
    routes: Arc<RouteTable>,
    gate: AuthGate,
    builder: ResponseBuilder,
}

impl Application {
    pub fn new(routes: RouteTable, roots: ContentRoots) -> Self {
        Self {
            routes: Arc::new(routes),
            gate: AuthGate::default(),
            builder: ResponseBuilder::new(roots),
        }
    }

    /// Produce the reply for one parsed request.
    pub async fn respond(&self, request: &Request) -> Reply {
        if !self.gate.admits(request) {
            tracing::debug!(path = %request.path, "No session cookie");
            return Reply::unauthorized();
        }

        let login_post = self.gate.is_login(request) && request.method == "POST";

        let Some(handler) = self.routes.get(&request.method, &request.path) else {
            if login_post {
                return Reply::unauthorized();
            }
            return self.builder.build(request).await;
        };

        let outcome = match handler.handle(&request.headers, &request.body) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(method = %request.method, path = %request.path, error = %e, "Handler failed");
                return Reply::internal_error();
            }
        };

        match outcome {
            Outcome::Accepted if login_post => {
                let cookie = [("Set-Cookie".to_string(), SESSION_COOKIE.to_string())];
                self.builder.build_for_path(DEFAULT_DOCUMENT, &cookie).await
            }
            _ if login_post => Reply::unauthorized(),
            Outcome::Rejected => Reply::unauthorized(),
            Outcome::Json(value) => self.builder.json(&value, &[]),
            Outcome::Accepted | Outcome::Continue => self.builder.build(request).await,
        }
    }

    async fn serve(&self, stream: &mut TcpStream) -> Result<(), ConnectionError> {
        let frame = read_frame(stream, Missing::Empty).await?;
        if !frame.complete {
            tracing::debug!(received = frame.head.len(), "Dropping connection without a request head");
            return Ok(());
        }

        let request = match Request::parse(&frame) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed request");
                return Ok(());
            }
        };

        let started = Instant::now();
        let reply = self.respond(&request).await;
        stream
            .write_all(&reply.bytes)
            .await
            .map_err(ConnectionError::Write)?;

        metrics::record_request(ROLE, reply.status, started);
        tracing::info!(
            method = %request.method,
            path = %request.path,
            status = reply.status,
            "Request served"
        );
        Ok(())
    }
}

impl ConnectionHandler for Application {
    async fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = self.serve(&mut stream).await {
            tracing::warn!(peer_addr = %peer, error = %e, "Connection failed");
        }
        let _ = stream.shutdown().await;
    }
}
