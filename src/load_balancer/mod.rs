//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Host header resolved to a virtual host
//!     → pool.rs (look up the hostname's VirtualHost)
//!     → apply its distribution policy:
//!         - one endpoint: always it
//!         - round_robin.rs (rotate through endpoints)
//!         - anything else: first endpoint, logged
//!     → backend.rs (Endpoint to connect to)
//! ```
//!
//! # Design Decisions
//! - Endpoint lists are immutable after startup
//! - Each virtual host owns its cursor; there is no global counter table
//! - Unknown policies degrade deterministically instead of failing

pub mod backend;
pub mod pool;
pub mod round_robin;

use std::fmt;

pub use backend::Endpoint;
pub use pool::{BackendPool, VirtualHost};
pub use round_robin::RoundRobinCursor;

/// Name of the round-robin policy in configuration files.
pub const ROUND_ROBIN: &str = "round-robin";

/// How one endpoint is picked from a pool of several.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DistributionPolicy {
    #[default]
    RoundRobin,
    /// A policy this engine does not implement; resolves to the first endpoint.
    Unsupported(String),
}

impl DistributionPolicy {
    /// Interpret a configured policy name; absent means round-robin.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            None | Some(ROUND_ROBIN) => Self::RoundRobin,
            Some(other) => Self::Unsupported(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::RoundRobin => ROUND_ROBIN,
            Self::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for DistributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names() {
        assert_eq!(DistributionPolicy::from_name(None), DistributionPolicy::RoundRobin);
        assert_eq!(
            DistributionPolicy::from_name(Some("round-robin")),
            DistributionPolicy::RoundRobin
        );
        assert_eq!(
            DistributionPolicy::from_name(Some("least-conn")),
            DistributionPolicy::Unsupported("least-conn".into())
        );
        assert_eq!(DistributionPolicy::Unsupported("ip-hash".into()).to_string(), "ip-hash");
    }
}
