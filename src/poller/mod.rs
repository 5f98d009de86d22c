//! The polling loop: refresh token, fetch the four resource lists, run the
//! collectors, sleep, repeat until the process is killed.

use crate::airbyte::model::{Connection, Destination, Job, Source};
use crate::airbyte::ApiClient;
use crate::auth::TokenManager;
use crate::collectors;
use crate::config::Config;
use crate::metrics::Metrics;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outbound requests must not hang the loop; generous but bounded
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Poller {
    tokens: TokenManager,
    client: ApiClient,
    metrics: Arc<Metrics>,
    interval: Duration,
}

impl Poller {
    pub fn new(config: &Config, metrics: Arc<Metrics>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let tokens = TokenManager::new(
            http.clone(),
            config.auth_url(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        let client = ApiClient::new(http, config.api_url.clone());

        Ok(Self {
            tokens,
            client,
            metrics,
            interval: Duration::from_secs(config.update_interval_seconds),
        })
    }

    /// Poll forever. A failed cycle is logged and the next one starts after
    /// the usual sleep; nothing short of process termination stops the loop.
    pub async fn run(mut self) {
        info!("poller started, interval {:?}", self.interval);
        loop {
            if let Err(error) = self.poll_once().await {
                error!("poll cycle failed: {error:#}");
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One full cycle. A token failure aborts the cycle; a single endpoint
    /// failure only degrades that endpoint to an empty list.
    pub async fn poll_once(&mut self) -> Result<()> {
        let bearer = self.tokens.bearer().await?;

        let jobs: Vec<Job> = self.fetch_or_empty("jobs", &bearer).await;
        let connections: Vec<Connection> = self.fetch_or_empty("connections", &bearer).await;
        let destinations: Vec<Destination> = self.fetch_or_empty("destinations", &bearer).await;
        let sources: Vec<Source> = self.fetch_or_empty("sources", &bearer).await;

        // Connections first: job metrics resolve names through the index
        let index = collectors::collect_connection_metrics(&self.metrics, &connections);
        collectors::collect_job_metrics(&self.metrics, &jobs, &index);
        collectors::collect_destination_metrics(&self.metrics, &destinations);
        collectors::collect_source_metrics(&self.metrics, &sources);

        Ok(())
    }

    async fn fetch_or_empty<T: DeserializeOwned>(&self, endpoint: &str, bearer: &str) -> Vec<T> {
        match self.client.list(endpoint, bearer).await {
            Ok(items) => {
                debug!("fetched {} items from {endpoint}", items.len());
                items
            }
            Err(error) => {
                warn!("failed to fetch {endpoint}: {error:#}");
                Vec::new()
            }
        }
    }
}
