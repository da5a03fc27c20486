//! Configuration schema definitions.
//!
//! Settings shared by every role. All sections derive Serde traits and
//! default every field, so an empty file (or no file) is a valid config.
//! Bind address and port come from the command line.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Static content location.
    pub content: ContentConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Credentials accepted by the tracker's login handler.
    pub tracker: TrackerConfig,

    /// Proxy role settings.
    pub proxy: ProxySettings,
}

/// Static content configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding `www/`, `static/{css,images,js}/`, `apps/`, `cert/`.
    pub base_dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "http_daemon=debug").
    pub log_level: String,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "http_daemon=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Tracker login credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub username: String,
    pub password: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Proxy role configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Virtual-host file.
    pub vhosts_path: PathBuf,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            vhosts_path: PathBuf::from("config/proxy.conf"),
        }
    }
}
