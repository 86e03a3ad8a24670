//! Directory API authentication: API key and `OAuth2` client credentials.
//!
//! Authentication is lazy. Nothing is fetched until the first request is
//! about to be sent, at which point an `OAuth2` token is acquired and cached.

use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::DirectoryCredentials;
use crate::error::{DirectoryError, DirectoryResult};

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_GRACE: Duration = Duration::from_secs(30);

/// `OAuth2` token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct OAuth2TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached `OAuth2` access token with expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Authentication handler for directory requests.
///
/// Clones share the token cache.
#[derive(Debug, Clone)]
pub struct DirectoryAuth {
    credentials: Arc<DirectoryCredentials>,
    token_endpoint: String,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl DirectoryAuth {
    /// Create a new auth handler.
    ///
    /// `token_endpoint` is only used for `OAuth2` credentials.
    #[must_use]
    pub fn new(
        credentials: DirectoryCredentials,
        token_endpoint: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials),
            token_endpoint: token_endpoint.into(),
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder.
    pub async fn apply(&self, builder: RequestBuilder) -> DirectoryResult<RequestBuilder> {
        match self.credentials.as_ref() {
            DirectoryCredentials::ApiKey { key } => Ok(builder.basic_auth(key, None::<&str>)),
            DirectoryCredentials::OAuth2 { .. } => {
                let token = self.bearer_token().await?;
                Ok(builder.bearer_auth(token))
            }
        }
    }

    /// Return the cached `OAuth2` access token, fetching a new one if needed.
    async fn bearer_token(&self) -> DirectoryResult<String> {
        let DirectoryCredentials::OAuth2 {
            client_id,
            client_secret,
            scopes,
        } = self.credentials.as_ref()
        else {
            return Err(DirectoryError::Auth(
                "bearer token requested for API key credentials".to_string(),
            ));
        };

        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        debug!("Fetching OAuth2 access token from {}", self.token_endpoint);
        let scope_str = scopes.join(" ");
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];
        if !scopes.is_empty() {
            form.push(("scope", &scope_str));
        }

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(DirectoryError::Auth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token_response: OAuth2TokenResponse = response.json().await.map_err(|e| {
            DirectoryError::Auth(format!("Failed to parse token response: {e}"))
        })?;

        let expires_at = token_response
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_GRACE));

        let access_token = token_response.access_token.clone();
        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(CachedToken {
                access_token: token_response.access_token,
                expires_at,
            });
        }

        Ok(access_token)
    }

    /// Drop the cached `OAuth2` token (e.g., on a 401 response).
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}
