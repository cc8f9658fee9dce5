//! Tasks API authentication: static bearer tokens and the OAuth2
//! refresh-token grant.
//!
//! Installed-app credentials carry a long-lived refresh token; short-lived
//! access tokens are minted on demand, cached in memory and invalidated when
//! the service answers 401.

use crate::error::{ApiError, ApiResult};
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Leeway subtracted from the advertised token lifetime so a token is never
/// used right at its expiry edge.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(30);

/// Stored credentials for a user profile.
///
/// The [`Debug`] impl redacts secrets to keep them out of log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Credentials {
    /// A pre-issued bearer token, used as-is. Mostly useful for tests and
    /// short-lived manual sessions.
    #[serde(rename = "bearer")]
    Bearer { token: String },

    /// OAuth2 refresh-token grant for an installed application.
    #[serde(rename = "oauth2")]
    Oauth2 {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        token_uri: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::Oauth2 {
                client_id,
                token_uri,
                ..
            } => f
                .debug_struct("Oauth2")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("refresh_token", &"[REDACTED]")
                .field("token_uri", token_uri)
                .finish(),
        }
    }
}

/// Token endpoint response for the refresh grant.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }
}

/// Applies authentication to outgoing requests, refreshing and caching
/// access tokens as needed.
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
    http: reqwest::Client,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    #[must_use]
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Attach a bearer token to the request, minting one first if required.
    pub async fn apply(&self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Drop any cached access token. Called on 401 so the next request mints
    /// a fresh one instead of replaying a revoked token.
    pub async fn invalidate_cache(&self) {
        let mut cached = self.cached.write().await;
        if cached.take().is_some() {
            debug!("Invalidated cached access token");
        }
    }

    async fn access_token(&self) -> ApiResult<String> {
        match &self.credentials {
            Credentials::Bearer { token } => Ok(token.clone()),
            Credentials::Oauth2 { .. } => {
                {
                    let cached = self.cached.read().await;
                    if let Some(token) = cached.as_ref() {
                        if !token.is_expired() {
                            return Ok(token.access_token.clone());
                        }
                    }
                }

                let mut cached = self.cached.write().await;
                // Another task may have refreshed while we waited for the lock.
                if let Some(token) = cached.as_ref() {
                    if !token.is_expired() {
                        return Ok(token.access_token.clone());
                    }
                }

                let fresh = self.refresh().await?;
                let access_token = fresh.access_token.clone();
                *cached = Some(fresh);
                Ok(access_token)
            }
        }
    }

    async fn refresh(&self) -> ApiResult<CachedToken> {
        let Credentials::Oauth2 {
            client_id,
            client_secret,
            refresh_token,
            token_uri,
        } = &self.credentials
        else {
            return Err(ApiError::Auth("no refresh credentials available".into()));
        };

        debug!(token_uri = %token_uri, "Refreshing access token");

        let response = self
            .http
            .post(token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "token refresh failed (status {status}): {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("malformed token response: {e}")))?;

        let expires_at = token.expires_in.map(|secs| {
            Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_LEEWAY)
        });

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
