//! Application route table.
//!
//! # Responsibilities
//! - Map `(METHOD, path)` to a handler
//! - Freeze the mapping before the listener starts
//!
//! # Design Decisions
//! - Built once through `RouteTableBuilder`, immutable afterwards, shared via
//!   `Arc` without locking
//! - Methods are stored uppercase; paths are matched exactly

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::http::headers::HeaderMap;
use crate::http::request::Body;

/// What a handler decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Success signal; on the login path this establishes the session.
    Accepted,
    /// Failure signal, answered with 401.
    Rejected,
    /// A structured value, answered with a 200 JSON envelope.
    Json(serde_json::Value),
    /// Nothing to say; serve the static file for the path.
    Continue,
}

impl Outcome {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HandlerError> {
        Ok(Outcome::Json(serde_json::to_value(value)?))
    }
}

/// Error raised by a handler; answered with 500.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler failed: {0}")]
    Failed(String),
    #[error("failed to encode handler value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A capability bound to a `(method, path)` pair.
pub trait Handler: Send + Sync {
    fn handle(&self, headers: &HeaderMap, body: &Body) -> Result<Outcome, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&HeaderMap, &Body) -> Result<Outcome, HandlerError> + Send + Sync,
{
    fn handle(&self, headers: &HeaderMap, body: &Body) -> Result<Outcome, HandlerError> {
        self(headers, body)
    }
}

type RouteKey = (String, String);

/// Immutable `(method, path) -> handler` map.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<RouteKey, Arc<dyn Handler>>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// A table with no handlers; every path falls through to static content.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, method: &str, path: &str) -> Option<&dyn Handler> {
        self.routes
            .get(&(method.to_ascii_uppercase(), path.to_string()))
            .map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.routes.keys().collect();
        keys.sort();
        f.debug_struct("RouteTable").field("routes", &keys).finish()
    }
}

/// Collects registrations before the table is frozen.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: HashMap<RouteKey, Arc<dyn Handler>>,
}

impl RouteTableBuilder {
    /// Register `handler` for one method.
    pub fn route<H>(self, method: &str, path: &str, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.route_methods(&[method], path, handler)
    }

    /// Register the same handler for several methods.
    pub fn route_methods<H>(mut self, methods: &[&str], path: &str, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        for method in methods {
            let key = (method.to_ascii_uppercase(), path.to_string());
            if self.routes.insert(key, Arc::clone(&handler)).is_some() {
                tracing::warn!(%method, %path, "route registered twice; keeping the later handler");
            }
        }
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: &HeaderMap, _: &Body) -> Result<Outcome, HandlerError> {
        Ok(Outcome::Accepted)
    }

    #[test]
    fn test_lookup_by_method_and_path() {
        let table = RouteTable::builder()
            .route("post", "/login", ok)
            .route("GET", "/get-list", |_: &HeaderMap, _: &Body| Outcome::json(&[1, 2]))
            .build();

        assert_eq!(table.len(), 2);
        assert!(table.get("POST", "/login").is_some());
        assert!(table.get("GET", "/login").is_none());
        assert!(table.get("GET", "/get-list/").is_none());

        let outcome = table
            .get("GET", "/get-list")
            .unwrap()
            .handle(&HeaderMap::new(), &Body::default())
            .unwrap();
        assert_eq!(outcome, Outcome::Json(serde_json::json!([1, 2])));
    }

    #[test]
    fn test_route_methods_shares_handler() {
        let table = RouteTable::builder()
            .route_methods(&["GET", "POST"], "/echo", ok)
            .build();

        assert!(table.get("GET", "/echo").is_some());
        assert!(table.get("POST", "/echo").is_some());
        assert!(table.get("PUT", "/echo").is_none());
    }

    #[test]
    fn test_empty_table() {
        let table = RouteTable::empty();
        assert!(table.is_empty());
        assert!(table.get("GET", "/index.html").is_none());
    }
}
