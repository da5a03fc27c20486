//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the parsers handle syntax)
//! - Check every `proxy_pass` target is `http://host:port`
//! - Detect duplicate or empty virtual-host names
//! - Check settings values that serde cannot (addresses, levels)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over parsed config
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::vhost::{parse_proxy_pass, ProxyPassError, VirtualHostConfig};

/// A single semantic problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("line {line}: host name is empty")]
    EmptyHost { line: usize },

    #[error("line {line}: host {host:?} already declared on line {first}")]
    DuplicateHost { host: String, line: usize, first: usize },

    #[error("line {line}: host {host:?}: {source}")]
    BadProxyPass {
        host: String,
        line: usize,
        source: ProxyPassError,
    },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("observability.log_level is empty")]
    EmptyLogLevel,
}

/// Check a parsed virtual-host file.
pub fn validate_virtual_hosts(hosts: &[VirtualHostConfig]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for vhost in hosts {
        let name = vhost.host.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyHost { line: vhost.line });
            continue;
        }

        if let Some(&first) = seen.get(&name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateHost {
                host: vhost.host.clone(),
                line: vhost.line,
                first,
            });
        } else {
            seen.insert(name.to_ascii_lowercase(), vhost.line);
        }

        for raw in &vhost.proxy_pass {
            if let Err(source) = parse_proxy_pass(raw) {
                errors.push(ValidationError::BadProxyPass {
                    host: vhost.host.clone(),
                    line: vhost.line,
                    source,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a settings file.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let obs = &settings.observability;

    if obs.log_level.trim().is_empty() {
        errors.push(ValidationError::EmptyLogLevel);
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::vhost::parse_virtual_hosts;

    #[test]
    fn test_valid_hosts() {
        let hosts = parse_virtual_hosts(
            "host \"a.com\" { proxy_pass http://127.0.0.1:9001; }\nhost \"b.com\" {}",
        )
        .unwrap();
        assert!(validate_virtual_hosts(&hosts).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let text = "host \"a.com\" { proxy_pass http://x; proxy_pass ftp://y:1; }\n\
                    host \"A.com\" { proxy_pass http://z:2; }\n\
                    host \"\" {}";
        let hosts = parse_virtual_hosts(text).unwrap();
        let errors = validate_virtual_hosts(&hosts).unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::BadProxyPass { .. }));
        assert!(matches!(errors[1], ValidationError::BadProxyPass { .. }));
        assert_eq!(
            errors[2],
            ValidationError::DuplicateHost { host: "A.com".into(), line: 2, first: 1 }
        );
        assert_eq!(errors[3], ValidationError::EmptyHost { line: 3 });
    }

    #[test]
    fn test_settings_checks() {
        let mut settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());

        settings.observability.metrics_enabled = true;
        settings.observability.metrics_address = "nowhere".into();
        settings.observability.log_level = " ".into();
        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
