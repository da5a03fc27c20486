//! Connection server.
//!
//! # Responsibilities
//! - Run the accept loop on a bound listener
//! - Spawn one task per accepted connection
//! - Stop accepting when the shutdown signal fires
//!
//! # Design Decisions
//! - The handler owns the stream; dropping it closes the socket on every path
//! - Accept errors are logged and the loop pauses for [`ACCEPT_BACKOFF`]
//!   before accepting again; running out of descriptors fails every accept
//! - In-flight connection tasks are not cancelled on shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::net::{ConnectionTracker, Listener};

/// Pause after a failed accept.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Serves one accepted connection to completion.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) -> impl Future<Output = ()> + Send;
}

/// Accept loop shared by every role.
pub struct HttpServer<H> {
    handler: Arc<H>,
    tracker: ConnectionTracker,
}

impl<H: ConnectionHandler> HttpServer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Accept connections until `shutdown` fires (or its sender is dropped).
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        match listener.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "HTTP server starting"),
            Err(e) => tracing::warn!(error = %e, "HTTP server starting on unknown address"),
        }

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            };

            match accepted {
                Ok((stream, peer)) => self.spawn(stream, peer),
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    if !back_off(&mut shutdown).await {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        tracing::info!(
            active_connections = self.tracker.active_count(),
            "HTTP server stopped"
        );
    }

    fn spawn(&self, stream: TcpStream, peer: SocketAddr) {
        let guard = self.tracker.track();
        let handler = Arc::clone(&self.handler);
        let span = tracing::info_span!("connection", id = %guard.id(), peer = %peer);

        tokio::spawn(
            async move {
                handler.handle(stream, peer).await;
                drop(guard);
            }
            .instrument(span),
        );
    }
}

/// Wait out [`ACCEPT_BACKOFF`]; false when shutdown fired meanwhile.
async fn back_off(shutdown: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => true,
        _ = shutdown.recv() => false,
    }
}
