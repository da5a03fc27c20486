//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one task each)
//!     → server.rs (accept loop, ConnectionHandler dispatch)
//!     → framer.rs (head up to \r\n\r\n, Content-Length body)
//!     → application role:
//!         request.rs (request line, headers, cookies, form body)
//!         → app.rs (auth gate, route table, outcome mapping)
//!         → response.rs + content.rs (static files, JSON, canned replies)
//!     → proxy role:
//!         proxy.rs (Host → backend, forward, relay)
//!     → write reply, close
//!
//! Outbound:
//!     client.rs (one request per connection, reply read to close)
//! ```
//!
//! # Design Decisions
//! - HTTP/1.1 only, one request per connection, always `Connection: close`
//! - Heads are decoded byte-for-char so framing never fails on encoding
//! - Chunked transfer-encoding and keep-alive are not supported

pub mod app;
pub mod client;
pub mod content;
pub mod framer;
pub mod headers;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use app::Application;
pub use client::{send_request, ClientError, ClientResponse, OutboundRequest};
pub use content::ContentRoots;
pub use framer::{read_frame, Frame, FrameError, Missing};
pub use headers::HeaderMap;
pub use proxy::ProxyHandler;
pub use request::{Body, ParseError, Request};
pub use response::{Reply, Response, ResponseBuilder};
pub use server::{ConnectionHandler, HttpServer};
