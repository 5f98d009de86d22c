use airbyte_exporter::{api, config::Config, metrics::Metrics, poller::Poller};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airbyte_exporter=info".into()),
        )
        .init();

    // Missing credentials abort startup before anything is served
    let config = Config::from_env().context("invalid configuration")?;
    let metrics = Arc::new(Metrics::new()?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("metrics server listening on {addr}");

    let router = api::create_router(Arc::clone(&metrics));
    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router).await {
            error!("metrics server terminated: {error}");
        }
    });

    Poller::new(&config, metrics)?.run().await;

    Ok(())
}
