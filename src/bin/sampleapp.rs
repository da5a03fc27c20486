//! Sample application role: the peer tracker.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use http_daemon::http::ContentRoots;
use http_daemon::lifecycle::{self, Shutdown, StartupError};
use http_daemon::tracker::{self, Credentials, PeerRegistry};
use http_daemon::Application;

#[derive(Debug, Parser)]
#[command(name = "sampleapp", about = "Peer tracker application", long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    server_ip: String,

    #[arg(long, default_value_t = 8000)]
    server_port: u16,

    /// Settings file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Sample app failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let settings = lifecycle::prepare(args.config.as_deref())?;
    let addr = lifecycle::bind_address(&args.server_ip, args.server_port)?;

    tracing::info!("sampleapp v{} starting", env!("CARGO_PKG_VERSION"));

    let routes = tracker::routes(
        Arc::new(PeerRegistry::new()),
        Credentials::from(&settings.tracker),
    );
    tracing::info!(routes = routes.len(), "Routes registered");

    let shutdown = Shutdown::new();
    lifecycle::trigger_on_ctrl_c(shutdown.clone());

    let app = Application::new(routes, ContentRoots::new(settings.content.base_dir));
    lifecycle::run_role("sampleapp", addr, app, &shutdown).await
}
