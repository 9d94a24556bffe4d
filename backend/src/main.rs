//! Service entry point: parse the CLI, ingest the bundle, serve HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::Trace;
use backend::domain::Store;
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::AppState;
use backend::{loader, server};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "tripmark", about = "In-memory travels query service")]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
    /// Data bundle (directory or single JSON file) ingested before serving.
    #[arg(long)]
    data: Option<PathBuf>,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();

    let store = Arc::new(Store::new());
    if let Some(path) = &cli.data {
        let stats = loader::load_bundle(&store, path).map_err(std::io::Error::other)?;
        info!(
            users = stats.users,
            locations = stats.locations,
            visits = stats.visits,
            "bundle ingested"
        );
    }

    let state = web::Data::new(AppState::new(store));
    let health = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flip below still sees it.
    let server_health = health.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(server_health.clone())
            .wrap(Trace)
            .configure(server::routes)
    })
    .bind(cli.bind)?;

    health.mark_ready();
    info!(bind = %cli.bind, "listening");
    server.run().await
}
