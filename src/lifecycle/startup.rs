//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn command-line bind options into a socket address
//! - Initialize logging and, when enabled, the metrics exporter
//! - Bind the role's listener and run its accept loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal for the binary
//! - Listeners start last (traffic only when ready)

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{load_settings_or_default, ConfigError, ObservabilityConfig, Settings};
use crate::http::{ConnectionHandler, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::{logging, metrics};

/// Error type for role startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address {0:?}")]
    Address(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("cannot start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("cannot read listener address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Combine `--server-ip` and `--server-port`.
pub fn bind_address(ip: &str, port: u16) -> Result<SocketAddr, StartupError> {
    let ip: IpAddr = ip
        .trim()
        .parse()
        .map_err(|_| StartupError::Address(ip.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

/// Install logging, then the Prometheus exporter if configured.
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), StartupError> {
    logging::init(config);

    if config.metrics_enabled {
        let addr = config
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }
    Ok(())
}

/// Load settings and install observability from them.
///
/// When the settings file cannot be loaded, logging is still installed with
/// defaults so the error can be reported.
pub fn prepare(config: Option<&Path>) -> Result<Settings, StartupError> {
    let settings = match load_settings_or_default(config) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            return Err(e.into());
        }
    };

    init_observability(&settings.observability)?;
    tracing::debug!(?settings, "Configuration loaded");
    Ok(settings)
}

/// Bind `addr` and spawn the accept loop; returns the bound address.
pub fn start_role<H: ConnectionHandler>(
    name: &'static str,
    addr: SocketAddr,
    handler: H,
    shutdown: &Shutdown,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError> {
    let listener = Listener::bind(addr)?;
    let local = listener.local_addr().map_err(StartupError::LocalAddr)?;
    let stop = shutdown.subscribe();

    tracing::info!(role = name, address = %local, "Role listening");

    let task = tokio::spawn(async move {
        HttpServer::new(handler).run(listener, stop).await;
        tracing::info!(role = name, "Role stopped");
    });
    Ok((local, task))
}

/// Bind `addr` and serve until `shutdown` fires.
pub async fn run_role<H: ConnectionHandler>(
    name: &'static str,
    addr: SocketAddr,
    handler: H,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let (_, task) = start_role(name, addr, handler, shutdown)?;
    if let Err(e) = task.await {
        tracing::error!(role = name, error = %e, "Accept loop panicked");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        assert_eq!(
            bind_address("0.0.0.0", 8080).unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(bind_address("::1", 9000).unwrap().port(), 9000);
        assert!(matches!(bind_address("localhost", 1), Err(StartupError::Address(_))));
    }
}
