//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the endpoint list and policy of every virtual host
//! - Apply the distribution policy to pick one endpoint
//! - Own one round-robin cursor per virtual host

use std::collections::HashMap;

use crate::config::vhost::{parse_proxy_pass, VirtualHostConfig};
use crate::load_balancer::{backend::Endpoint, round_robin::RoundRobinCursor, DistributionPolicy};

/// Endpoints and selection state for one hostname.
#[derive(Debug)]
pub struct VirtualHost {
    endpoints: Vec<Endpoint>,
    policy: DistributionPolicy,
    cursor: RoundRobinCursor,
}

impl VirtualHost {
    pub fn new(endpoints: Vec<Endpoint>, policy: DistributionPolicy) -> Self {
        Self {
            endpoints,
            policy,
            cursor: RoundRobinCursor::new(),
        }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn policy(&self) -> &DistributionPolicy {
        &self.policy
    }

    /// Pick the endpoint for the next request.
    pub fn select(&self) -> Option<&Endpoint> {
        match self.endpoints.as_slice() {
            [] => None,
            [only] => Some(only),
            many => match &self.policy {
                DistributionPolicy::RoundRobin => Some(&many[self.cursor.advance(many.len())]),
                DistributionPolicy::Unsupported(name) => {
                    tracing::warn!(policy = %name, "unsupported distribution policy, using first backend");
                    many.first()
                }
            },
        }
    }
}

/// Virtual hosts keyed by lowercased hostname.
#[derive(Debug, Default)]
pub struct BackendPool {
    hosts: HashMap<String, VirtualHost>,
}

impl BackendPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pool from parsed virtual-host blocks.
    ///
    /// Targets that do not parse are skipped with a warning; validation
    /// normally rejects them before this point.
    pub fn from_config(configs: Vec<VirtualHostConfig>) -> Self {
        let mut pool = Self::new();

        for config in configs {
            let mut endpoints = Vec::with_capacity(config.proxy_pass.len());
            for raw in &config.proxy_pass {
                match parse_proxy_pass(raw) {
                    Ok(endpoint) => endpoints.push(endpoint),
                    Err(e) => tracing::warn!(host = %config.host, target = %raw, error = %e, "Invalid backend address"),
                }
            }

            let policy = DistributionPolicy::from_name(config.dist_policy.as_deref());
            tracing::debug!(host = %config.host, backends = endpoints.len(), %policy, "virtual host configured");
            pool.insert(&config.host, VirtualHost::new(endpoints, policy));
        }

        pool
    }

    pub fn insert(&mut self, hostname: &str, vhost: VirtualHost) {
        self.hosts.insert(hostname.trim().to_ascii_lowercase(), vhost);
    }

    pub fn get(&self, hostname: &str) -> Option<&VirtualHost> {
        self.hosts.get(&hostname.trim().to_ascii_lowercase())
    }

    /// Select an endpoint for `hostname`, if it is configured and non-empty.
    pub fn select(&self, hostname: &str) -> Option<&Endpoint> {
        self.get(hostname)?.select()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }
}
