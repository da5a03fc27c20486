//! Backend role: static content behind the session-cookie gate.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use http_daemon::http::ContentRoots;
use http_daemon::lifecycle::{self, Shutdown, StartupError};
use http_daemon::routing::RouteTable;
use http_daemon::Application;

#[derive(Debug, Parser)]
#[command(name = "backend", about = "Static content backend", long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    server_ip: String,

    #[arg(long, default_value_t = 9000)]
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
            tracing::error!(error = %e, "Backend failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), StartupError> {
    let settings = lifecycle::prepare(args.config.as_deref())?;
    let addr = lifecycle::bind_address(&args.server_ip, args.server_port)?;

    tracing::info!(
        base_dir = %settings.content.base_dir.display(),
        "backend v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let shutdown = Shutdown::new();
    lifecycle::trigger_on_ctrl_c(shutdown.clone());

    let app = Application::new(RouteTable::empty(), ContentRoots::new(settings.content.base_dir));
    lifecycle::run_role("backend", addr, app, &shutdown).await
}
