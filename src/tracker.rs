//! Peer tracker application.
//!
//! Routes served by the `sampleapp` role:
//! - `POST /login` checks the form credentials
//! - `POST /submit-info` registers an `ip`/`port` pair once
//! - `GET /get-list` returns every registered pair, oldest first

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::http::headers::HeaderMap;
use crate::http::request::Body;
use crate::routing::gate::has_session;
use crate::routing::{HandlerError, Outcome, RouteTable};

/// A registered peer, serialized as `[ip, port]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer(pub String, pub u16);

/// Peers in registration order, without duplicates.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: Mutex<Vec<Peer>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `peer` unless already present. Returns true when it was added.
    pub fn register(&self, peer: Peer) -> bool {
        let mut peers = self.peers.lock().unwrap_or_else(PoisonError::into_inner);
        if peers.contains(&peer) {
            return false;
        }
        peers.push(peer);
        true
    }

    pub fn snapshot(&self) -> Vec<Peer> {
        self.peers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Username and password accepted by `/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl From<&TrackerConfig> for Credentials {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

#[derive(Debug, Serialize)]
struct Registered {
    status: &'static str,
    message: &'static str,
}

const REGISTERED: Registered = Registered {
    status: "success",
    message: "Peer registered successfully",
};

/// Build the tracker's route table.
pub fn routes(registry: Arc<PeerRegistry>, credentials: Credentials) -> RouteTable {
    let listing = Arc::clone(&registry);

    RouteTable::builder()
        .route("POST", "/login", move |_: &HeaderMap, body: &Body| {
            Ok::<_, HandlerError>(login(&credentials, body))
        })
        .route("POST", "/submit-info", move |_: &HeaderMap, body: &Body| {
            submit_info(&registry, body)
        })
        .route("GET", "/get-list", move |headers: &HeaderMap, _: &Body| {
            get_list(&listing, headers)
        })
        .build()
}

fn login(credentials: &Credentials, body: &Body) -> Outcome {
    let accepted = body.get("username") == Some(credentials.username.as_str())
        && body.get("password") == Some(credentials.password.as_str());

    if accepted {
        tracing::info!(username = %credentials.username, "Login successful");
        Outcome::Accepted
    } else {
        tracing::info!(username = body.get("username").unwrap_or_default(), "Login failed");
        Outcome::Rejected
    }
}

fn submit_info(registry: &PeerRegistry, body: &Body) -> Result<Outcome, HandlerError> {
    let (Some(ip), Some(port)) = (
        body.get("ip").filter(|v| !v.is_empty()),
        body.get("port").filter(|v| !v.is_empty()),
    ) else {
        tracing::warn!("Peer registration without ip or port");
        return Ok(Outcome::Rejected);
    };

    let Ok(port) = port.trim().parse::<u16>() else {
        tracing::warn!(%ip, %port, "Peer registration with invalid port");
        return Ok(Outcome::Rejected);
    };

    if registry.register(Peer(ip.to_string(), port)) {
        tracing::info!(%ip, port, peers = registry.len(), "Peer registered");
    } else {
        tracing::debug!(%ip, port, "Peer already registered");
    }
    Outcome::json(&REGISTERED)
}

fn get_list(registry: &PeerRegistry, headers: &HeaderMap) -> Result<Outcome, HandlerError> {
    if !has_session(headers) {
        return Ok(Outcome::Rejected);
    }
    Outcome::json(&registry.snapshot())
}
