//! TCP listener.
//!
//! # Responsibilities
//! - Bind to the role's address with `SO_REUSEADDR`
//! - Listen with a fixed backlog
//! - Accept incoming TCP connections
//!
//! There is no connection limit: the backlog and OS buffers are the only
//! backpressure.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// Pending-connection queue length passed to `listen`.
pub const BACKLOG: u32 = 50;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind or listen; fatal for the role.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to accept one connection.
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// A bound, listening TCP socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `addr` and start listening.
    pub fn bind(addr: SocketAddr) -> Result<Self, ListenerError> {
        let bind_err = |source| ListenerError::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;

        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let inner = socket.listen(BACKLOG).map_err(bind_err)?;

        let local_addr = inner.local_addr().map_err(bind_err)?;
        tracing::info!(address = %local_addr, backlog = BACKLOG, "Listener bound");

        Ok(Self { inner })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, peer) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(peer_addr = %peer, "Connection accepted");
        Ok((stream, peer))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}
