//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse CLI → Load settings → Init logging/metrics → Bind listener → Accept
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → In-flight connections finish on their own
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then listeners
//! - A bind failure is the only fatal runtime error

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{trigger_on_ctrl_c, wait_for_ctrl_c};
pub use startup::{bind_address, init_observability, prepare, run_role, start_role, StartupError};
