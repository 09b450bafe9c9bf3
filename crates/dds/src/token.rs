//! Bearer-token cache with expiry

use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use fixity_errors::{ApiError, Result};
use fixity_types::{ApiToken, Credentials};

use crate::client::classify;

const TOKEN_PREAMBLE: &str = "unable to get agent api_token";

/// Whether a token issued at `issued_at` with lifetime `ttl` (both in epoch
/// seconds) is expired at `now`. Half-open: exactly at `issued_at + ttl`
/// the token is already expired.
#[must_use]
pub fn is_expired(issued_at: i64, ttl: i64, now: i64) -> bool {
    now - issued_at >= ttl
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    issued_at: i64,
    ttl: i64,
}

/// Obtains and caches one agent bearer token
///
/// The slot holds at most one token. While the token is valid, `token`
/// returns it with zero network calls; once invalid it is never reused and
/// the next access performs exactly one fresh authentication request. A
/// failed authentication leaves the slot empty, so the call after it
/// retries.
#[derive(Debug)]
pub struct TokenCache {
    credentials: Credentials,
    slot: Option<CachedToken>,
}

impl TokenCache {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            slot: None,
        }
    }

    /// The current token, authenticating first if none is cached or the
    /// cached one has expired.
    ///
    /// # Errors
    ///
    /// Returns a classified API error when the token request fails or its
    /// payload cannot be decoded.
    pub async fn token(&mut self, http: &Client, base: &Url) -> Result<String> {
        if let Some(cached) = &self.slot {
            if !is_expired(cached.issued_at, cached.ttl, Utc::now().timestamp()) {
                return Ok(cached.token.clone());
            }
            debug!("cached api_token expired, re-authenticating");
            self.slot = None;
        }

        let fresh = self.authenticate(http, base).await?;
        let token = fresh.token.clone();
        self.slot = Some(fresh);
        Ok(token)
    }

    async fn authenticate(&self, http: &Client, base: &Url) -> Result<CachedToken> {
        let url = format!(
            "{}/software_agents/api_token",
            base.as_str().trim_end_matches('/')
        );
        let body = serde_json::to_string(&self.credentials)?;

        let response = http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ApiError::transport)?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(TOKEN_PREAMBLE, status, &body).into());
        }

        let payload: ApiToken = response.json().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })?;

        debug!(ttl = payload.time_to_live, "issued fresh api_token");
        Ok(CachedToken {
            token: payload.api_token,
            issued_at: Utc::now().timestamp(),
            ttl: payload.time_to_live,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_half_open() {
        // valid anywhere inside [t0, t0+ttl)
        assert!(!is_expired(100, 60, 100));
        assert!(!is_expired(100, 60, 159));
        // expired exactly at t0+ttl and after
        assert!(is_expired(100, 60, 160));
        assert!(is_expired(100, 60, 200));
    }

    #[test]
    fn zero_ttl_is_immediately_expired() {
        assert!(is_expired(100, 0, 100));
    }
}
