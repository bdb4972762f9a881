use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod error;
mod fetch;
mod routes;
mod sources;
mod upstream;
mod utils;

#[cfg(test)]
mod testing;

use config::Config;
use routes::{create_router, AppState};
use upstream::HttpUpstream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oceancare_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    for (service, credential) in config.credentials() {
        match credential.status() {
            "configured" => tracing::info!(service, "API key configured"),
            status => tracing::warn!(service, status, "API key not configured"),
        }
    }

    let upstream = Arc::new(HttpUpstream::new(config.upstream_timeout)?);
    let port = config.port;

    let state = AppState::new(config, upstream);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server starting on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
