use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use argo_server::{create_app, ArgoServer};
use error_common::{ArgoError, Result};

/// Argo CRM Engine HTTP Server
#[derive(Parser, Debug)]
#[command(name = "argo-server")]
#[command(about = "Business CRM dashboard HTTP API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("🚀 Starting Argo CRM Engine HTTP Server");
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION"));
    info!("🌐 Bind address: {}:{}", args.host, args.port);

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => info!("No .env file loaded: {} (using system env vars)", e),
    }

    let server = ArgoServer::new().await?;
    let app = create_app(server);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| ArgoError::ConfigError(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ArgoError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;

    info!("✅ Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ArgoError::ServerError(e.to_string()))?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
