//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Application role:
//!     Request (method, path, cookies)
//!     → gate.rs (login path open, everything else needs the session cookie)
//!     → table.rs ((METHOD, path) lookup)
//!     → Handler outcome, or static serve when no handler matches
//!
//! Proxy role:
//!     Request (Host header)
//!     → router.rs (hostname → virtual host)
//!     → load_balancer (policy picks an endpoint)
//! ```
//!
//! # Design Decisions
//! - Route tables are built before the listener starts, immutable at runtime
//! - Exact path matching only
//! - Deterministic: same input always matches same route

pub mod gate;
pub mod router;
pub mod table;

pub use gate::{AuthGate, LOGIN_PATH, SESSION_COOKIE};
pub use router::{hostname_of, ProxyRouter, UNKNOWN_HOST};
pub use table::{Handler, HandlerError, Outcome, RouteTable, RouteTableBuilder};
