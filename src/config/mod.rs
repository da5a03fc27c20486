//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)            virtual-host file (host "..." { ... })
//!     → loader.rs (read & deserialize)   → vhost.rs (tokenize & parse)
//!     → validation.rs (semantic checks, all errors at once)
//!     → Settings / Vec<VirtualHostConfig> (validated, immutable)
//!     → handed to the role at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All settings fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde, vhost parser) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod vhost;

pub use loader::{load_settings, load_settings_or_default, load_virtual_hosts, ConfigError};
pub use schema::{ContentConfig, ObservabilityConfig, ProxySettings, Settings, TrackerConfig};
pub use vhost::VirtualHostConfig;
