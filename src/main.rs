//! Reverse proxy role.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                    PROXY                      │
//!                         │                                               │
//!     Client Request      │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!     ────────────────────┼─▶│   net    │──▶│ framer  │──▶│  router   │  │
//!                         │  │ listener │   │         │   │ Host → vh │  │
//!                         │  └──────────┘   └─────────┘   └─────┬─────┘  │
//!                         │                                     │        │
//!                         │                                     ▼        │
//!                         │                              ┌─────────────┐ │
//!                         │                              │load_balancer│ │
//!                         │                              │ round-robin │ │
//!                         │                              └──────┬──────┘ │
//!                         │                                     │        │
//!     Client Response     │  ┌──────────┐                ┌──────▼──────┐ │
//!     ◀───────────────────┼──│  relay   │◀───────────────│   forward   │◀┼──── Backend
//!                         │  └──────────┘                └─────────────┘ │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! Unknown hosts and unreachable backends are answered with a canned 404.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use http_daemon::config::load_virtual_hosts;
use http_daemon::lifecycle::{self, Shutdown, StartupError};
use http_daemon::load_balancer::BackendPool;
use http_daemon::routing::ProxyRouter;
use http_daemon::ProxyHandler;

#[derive(Debug, Parser)]
#[command(name = "proxy", about = "Virtual-host reverse proxy", long_about = None)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    server_ip: String,

    /// Port to bind.
    #[arg(long, default_value_t = 8080)]
    server_port: u16,

    /// Settings file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Virtual-host file; overrides `proxy.vhosts_path`.
    #[arg(long)]
    vhosts: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Proxy failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let settings = lifecycle::prepare(args.config.as_deref())?;
    let addr = lifecycle::bind_address(&args.server_ip, args.server_port)?;

    tracing::info!("proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let vhosts_path = args.vhosts.unwrap_or(settings.proxy.vhosts_path);
    let hosts = load_virtual_hosts(&vhosts_path)?;
    let pool = BackendPool::from_config(hosts);

    let mut names: Vec<&str> = pool.hostnames().collect();
    names.sort_unstable();
    tracing::info!(
        vhosts = %vhosts_path.display(),
        hosts = pool.len(),
        names = ?names,
        "Virtual hosts loaded"
    );

    let shutdown = Shutdown::new();
    lifecycle::trigger_on_ctrl_c(shutdown.clone());

    let handler = ProxyHandler::new(ProxyRouter::new(pool));
    lifecycle::run_role("proxy", addr, handler, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
