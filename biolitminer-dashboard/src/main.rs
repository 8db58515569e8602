use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use biolitminer_client::config::DEFAULT_EMAIL;
use biolitminer_client::{ClientConfig, PubMedClient};
use clap::Parser;
use tracing::info;

mod logging;
mod routes;
mod views;

use routes::AppState;

#[derive(Parser)]
#[command(
    name = "biolitminer-dashboard",
    about = "BioLitMiner web dashboard for biomedical literature search"
)]
struct Args {
    /// Address to bind
    #[arg(long, env = "BIOLITMINER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "BIOLITMINER_PORT", default_value_t = 8501)]
    port: u16,

    /// Default contact email for PubMed requests
    #[arg(short, long, env = "NCBI_EMAIL", default_value = DEFAULT_EMAIL)]
    email: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let logs = logging::init();

    let client = PubMedClient::with_config(ClientConfig::new().with_email(&args.email))
        .context("Failed to create PubMed client")?;
    let state = Arc::new(AppState::new(client, logs));
    let app = routes::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Dashboard listening");
    println!("BioLitMiner dashboard running at http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
