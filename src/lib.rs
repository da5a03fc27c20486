//! Minimal HTTP/1.1 daemon library.
//!
//! Three roles share one engine:
//! - `proxy`: virtual-host reverse proxy with round-robin backends
//! - `backend`: static content behind the session-cookie gate
//! - `sampleapp`: the peer tracker routes on top of the backend role

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod routing;
pub mod tracker;

pub use config::Settings;
pub use http::{Application, HttpServer, ProxyHandler};
pub use lifecycle::Shutdown;
