//! Backend endpoint addressing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One `host:port` a virtual host forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Error type for endpoint parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint {0:?} is not host:port")]
    MissingPort(String),
    #[error("endpoint {0:?} has an empty host")]
    EmptyHost(String),
    #[error("endpoint {0:?} has an invalid port")]
    InvalidPort(String),
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| EndpointError::MissingPort(s.to_string()))?;
        if host.is_empty() {
            return Err(EndpointError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse()
            .map_err(|_| EndpointError::InvalidPort(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        let ep: Endpoint = "127.0.0.1:9001".parse().unwrap();
        assert_eq!(ep, Endpoint::new("127.0.0.1", 9001));
        assert_eq!(ep.to_string(), "127.0.0.1:9001");

        let ep: Endpoint = "backend.local:80".parse().unwrap();
        assert_eq!(ep.host, "backend.local");
    }

    #[test]
    fn test_reject_bad_endpoints() {
        assert!(matches!("localhost".parse::<Endpoint>(), Err(EndpointError::MissingPort(_))));
        assert!(matches!(":80".parse::<Endpoint>(), Err(EndpointError::EmptyHost(_))));
        assert!(matches!("a:http".parse::<Endpoint>(), Err(EndpointError::InvalidPort(_))));
        assert!(matches!("a:70000".parse::<Endpoint>(), Err(EndpointError::InvalidPort(_))));
    }
}
