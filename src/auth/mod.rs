//! OAuth client-credentials token management.
//!
//! The Airbyte public API authenticates with short-lived bearer tokens
//! obtained by exchanging an application client id/secret. The manager caches
//! one token and re-exchanges when it is missing or close to expiry.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};


/// Tokens are refreshed this many seconds before their actual expiry
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// A cached bearer token with its absolute expiry
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// True if the token is still usable at `now`, honoring the refresh skew
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECONDS) < self.expires_at
    }
}

/// Standard OAuth 2.0 token response
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Owns the current token and refreshes it on demand
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Option<CachedToken>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            cached: None,
        }
    }

    /// Return a bearer token valid for at least the skew window, exchanging
    /// credentials first when necessary. Exchange failures propagate; the
    /// caller decides whether to abort or retry later.
    pub async fn bearer(&mut self) -> Result<String> {
        if let Some(cached) = &self.cached {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        let token = self
            .exchange()
            .await
            .context("client credentials exchange failed")?;
        let bearer = token.access_token.clone();
        self.cached = Some(token);
        Ok(bearer)
    }

    /// Perform the client-credentials exchange against the token endpoint
    async fn exchange(&self) -> Result<CachedToken> {
        let mut form_data = HashMap::new();
        form_data.insert("grant_type", "client_credentials");
        form_data.insert("client_id", self.client_id.as_str());
        form_data.insert("client_secret", self.client_secret.as_str());

        debug!("requesting access token from {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&form_data)
            .send()
            .await
            .context("failed to send token request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("token endpoint returned {}: {}", status, body));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .context("failed to parse token response")?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        info!("new access token fetched, expires at {}", expires_at);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}
