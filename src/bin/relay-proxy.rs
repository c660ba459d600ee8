//! Klinesignal relay proxy
//!
//! Fetches allow-listed exchange URLs on behalf of clients that cannot reach
//! the exchange directly. Serves `/api/cors-proxy?url=`, `/health` and `/metrics`.

use dotenvy::dotenv;
use klinesignal::config::ClientConfig;
use klinesignal::core::http::start_relay_server;
use klinesignal::logging;
use std::env;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let config = ClientConfig::from_env()?;

    let env = klinesignal::config::get_environment();
    info!("Starting klinesignal relay proxy");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_relay_server(port, &config).await {
            error!(error = %e, "relay server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down relay proxy...");
        }
        _ = server_handle => {
            error!("relay server stopped");
        }
    }

    Ok(())
}
