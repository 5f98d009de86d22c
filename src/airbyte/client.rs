//! Read-only client for the Airbyte public API list endpoints.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// List responses are wrapped in a `data` envelope. A missing field
/// deserializes to an empty list rather than an error.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Issues bearer-authenticated GETs against `{base_url}/{endpoint}`
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Fetch one resource collection. Any failure (transport, non-2xx,
    /// malformed body) is an error; the caller chooses how to degrade.
    pub async fn list<T: DeserializeOwned>(&self, endpoint: &str, bearer: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("{} returned {}: {}", url, status, body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("failed to parse response from {url}"))?;

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airbyte::model::Job;

    #[test]
    fn test_envelope_unwraps_data() {
        let json = r#"{"data": [{"status": "running"}, {"status": "pending"}], "next": "..."}"#;
        let envelope: Envelope<Job> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 2);
    }

    #[test]
    fn test_envelope_missing_data_is_empty() {
        let envelope: Envelope<Job> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
    }
}
