use anyhow::{Context, Result};
use axum::{Router, extract::FromRef};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

// Declare modules
mod config;
mod error;
mod feed;
mod models;
mod query;
mod routes;
#[cfg(test)]
mod test_support;

// Shared by every handler
#[derive(Clone, FromRef)]
struct AppState {
    settings: Arc<Settings>,
    http_client: Arc<Client>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first so RUST_LOG from it applies. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_catalog=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing car catalog server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!(
                feed_url = %s.feed_url,
                items_per_page = s.items_per_page,
                "Configuration loaded successfully."
            );
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    let http_client = Arc::new(
        Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(shared_settings.fetch_timeout_secs))
            .build()
            .context("Failed to build shared reqwest client")?,
    );
    tracing::info!("Shared HTTP client created.");

    let app_state = AppState {
        settings: shared_settings.clone(),
        http_client,
    };

    let router: Router = routes::create_router(app_state);
    let app = router.nest_service("/static", ServeDir::new("static"));

    let addr: SocketAddr = match shared_settings.server_address.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(
                "Invalid server address format in configuration ('{}'): {}",
                shared_settings.server_address,
                e
            );
            return Err(anyhow::anyhow!(
                "Invalid server address format: {}",
                shared_settings.server_address
            ));
        }
    };

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
