//! Command-line client for the tracker application.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use serde_json::Value;

use http_daemon::http::{send_request, ClientResponse, OutboundRequest};

#[derive(Parser)]
#[command(name = "tracker-cli")]
#[command(about = "Command-line client for the peer tracker", long_about = None)]
struct Cli {
    /// Tracker (or proxy) address.
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    addr: SocketAddr,

    /// Host header; selects the virtual host when talking to a proxy.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Session cookie; when absent, the CLI logs in first.
    #[arg(short, long)]
    cookie: Option<String>,

    #[arg(short, long, default_value = "admin")]
    username: String,

    #[arg(short, long, default_value = "password")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session cookie
    Login,
    /// Register a peer
    Register {
        #[arg(long)]
        ip: String,
        #[arg(long)]
        port: u16,
    },
    /// List registered peers
    Peers,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Login => {
            let cookie = login(&cli).await?;
            println!("{cookie}");
        }
        Commands::Register { ip, port } => {
            let cookie = session(&cli).await?;
            let request = OutboundRequest::post("/submit-info")
                .host(&cli.host)
                .cookie(cookie)
                .field("ip", ip)
                .field("port", port.to_string());
            print_response(send_request(cli.addr, &request).await?)?;
        }
        Commands::Peers => {
            let cookie = session(&cli).await?;
            let request = OutboundRequest::get("/get-list").host(&cli.host).cookie(cookie);
            print_response(send_request(cli.addr, &request).await?)?;
        }
    }

    Ok(())
}

async fn session(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    match &cli.cookie {
        Some(cookie) => Ok(cookie.clone()),
        None => login(cli).await,
    }
}

async fn login(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let request = OutboundRequest::post("/login")
        .host(&cli.host)
        .field("username", &cli.username)
        .field("password", &cli.password);
    let response = send_request(cli.addr, &request).await?;

    match response.session_cookie() {
        Some(cookie) => Ok(cookie.to_string()),
        None => Err(format!("login rejected with status {}", response.status).into()),
    }
}

fn print_response(res: ClientResponse) -> Result<(), Box<dyn std::error::Error>> {
    if res.status != 200 {
        eprintln!("Error: tracker returned status {}", res.status);
        eprintln!("Response: {}", res.text());
        return Ok(());
    }

    let json: Value = res.json()?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
