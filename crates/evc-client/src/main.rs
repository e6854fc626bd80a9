mod app_state;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use evc_api::create_app;

use crate::app_state::AppState;
use crate::config::AppConfig;

/// Command line arguments for the EV charging client
#[derive(Parser, Debug)]
#[command(name = "evc-client")]
#[command(about = "EV charging client for stations around Bishkek")]
struct Args {
    /// Path to the client configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt().pretty().init();

    let config = match &args.config {
        Some(path) => {
            let config = AppConfig::from_file(path).await?;
            tracing::info!("Loaded client config from {}", path.display());
            config
        }
        None => {
            tracing::info!("No config file given, using defaults");
            AppConfig::default()
        }
    };

    let state = AppState::new(&config).await?;
    state.preload().await?;

    let app = create_app(state.engine.clone());

    let bind_addr = format!("0.0.0.0:{}", args.port);
    tracing::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
