//! Virtual-host resolution for the proxy role.
//!
//! # Responsibilities
//! - Read the hostname a request is addressed to
//! - Ask the backend pool for the endpoint to forward to
//! - Return an explicit `None` for unknown or empty hosts
//!
//! # Design Decisions
//! - The pool is passed in explicitly and shared through `Arc`
//! - No network I/O happens here; a `None` lets the caller answer 404
//!   without opening any connection

use std::sync::Arc;

use crate::http::headers::HeaderMap;
use crate::load_balancer::{BackendPool, Endpoint};
use crate::observability::metrics;

/// Hostname used when a request carries no `Host` header.
pub const UNKNOWN_HOST: &str = "unknown";

/// Maps hostnames to backend endpoints.
#[derive(Debug, Clone)]
pub struct ProxyRouter {
    pool: Arc<BackendPool>,
}

impl ProxyRouter {
    pub fn new(pool: BackendPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Pick the endpoint for `hostname`.
    pub fn resolve(&self, hostname: &str) -> Option<Endpoint> {
        let endpoint = self.pool.select(hostname)?.clone();
        metrics::record_backend_selection(hostname, &endpoint.to_string());
        tracing::debug!(host = %hostname, backend = %endpoint, "Backend selected");
        Some(endpoint)
    }
}

/// The request's hostname, lowercased and trimmed, or [`UNKNOWN_HOST`].
pub fn hostname_of(headers: &HeaderMap) -> String {
    headers
        .get("host")
        .map(|host| host.trim().to_ascii_lowercase())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::vhost::parse_virtual_hosts;
    use std::collections::HashMap;
    use std::thread;

    fn router(text: &str) -> ProxyRouter {
        ProxyRouter::new(BackendPool::from_config(parse_virtual_hosts(text).unwrap()))
    }

    #[test]
    fn test_round_robin_scenario() {
        let router = router(
            "host \"app.local\" {\n\
               proxy_pass http://127.0.0.1:9001;\n\
               proxy_pass http://127.0.0.1:9002;\n\
               dist_policy round-robin;\n\
             }",
        );

        let ports: Vec<u16> = (0..4)
            .map(|_| router.resolve("app.local").unwrap().port)
            .collect();
        assert_eq!(ports, vec![9001, 9002, 9001, 9002]);
    }

    #[test]
    fn test_unknown_host_resolves_nothing() {
        let router = router("host \"app.local\" { proxy_pass http://127.0.0.1:9001; }");
        assert!(router.resolve("other.local").is_none());
        assert!(router.resolve(UNKNOWN_HOST).is_none());
    }

    #[test]
    fn test_hostname_of() {
        let headers = HeaderMap::from_head("GET / HTTP/1.1\r\nHost:  App.Local \r\n");
        assert_eq!(hostname_of(&headers), "app.local");

        let headers = HeaderMap::from_head("GET / HTTP/1.1\r\nAccept: */*");
        assert_eq!(hostname_of(&headers), UNKNOWN_HOST);
    }

    #[test]
    fn test_concurrent_spread_is_fair() {
        let router = router(
            "host \"a.com\" { proxy_pass http://h:1; proxy_pass http://h:2; proxy_pass http://h:3; }",
        );

        let picks: Vec<u16> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        (0..30)
                            .map(|_| router.resolve("a.com").unwrap().port)
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let mut counts: HashMap<u16, usize> = HashMap::new();
        for port in picks {
            *counts.entry(port).or_default() += 1;
        }
        let max = counts.values().max().unwrap();
        let min = counts.values().min().unwrap();
        assert_eq!(counts.len(), 3);
        assert!(max - min <= 1);
    }
}
