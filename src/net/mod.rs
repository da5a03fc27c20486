//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind with SO_REUSEADDR, backlog 50, accept)
//!     → connection.rs (id, live-connection count)
//!     → Hand off to HTTP layer (one task per connection)
//! ```
//!
//! # Design Decisions
//! - No connection cap and no read timeout; a silent peer holds its task
//! - Each connection tracked for logs and the active-connections gauge

pub mod connection;
pub mod listener;

pub use connection::{ConnectionError, ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError, BACKLOG};
