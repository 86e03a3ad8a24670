//! HTTP client for the directory API (reqwest-based).

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::DirectoryAuth;
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::gateway::DirectoryGateway;
use crate::models::{
    CreateInvitationRequest, Invitation, Role, UpdateRoleRequest, User, UserListResponse,
    UserMutation,
};

/// Directory API client for a single tailnet.
#[derive(Debug, Clone)]
pub struct TailnetClient {
    /// Base URL, e.g. "<https://api.tailscale.com>".
    base_url: Url,
    /// Tenant scope.
    tailnet: String,
    auth: DirectoryAuth,
    http_client: Client,
}

impl TailnetClient {
    /// Create a client from validated configuration.
    pub fn new(config: &DirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;
        let credentials = config
            .credentials
            .clone()
            .ok_or_else(|| DirectoryError::Config("credentials are required".to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                DirectoryError::Config(format!("Failed to build HTTP client: {e}"))
            })?;

        let base_url = parse_base_url(&config.base_url)?;
        let token_endpoint = endpoint(&base_url, &["api", "v2", "oauth", "token"])?;
        let auth = DirectoryAuth::new(credentials, token_endpoint.as_str(), http_client.clone());

        Ok(Self {
            base_url,
            tailnet: config.scope().to_string(),
            auth,
            http_client,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    pub fn with_http_client(
        base_url: &str,
        tailnet: impl Into<String>,
        auth: DirectoryAuth,
        http_client: Client,
    ) -> DirectoryResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            tailnet: tailnet.into(),
            auth,
            http_client,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn tailnet_url(&self, collection: &str) -> DirectoryResult<Url> {
        endpoint(
            &self.base_url,
            &["api", "v2", "tailnet", &self.tailnet, collection],
        )
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> DirectoryResult<reqwest::Response> {
        debug!("Directory {} {}", method, url);
        let mut builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(b) = body {
            builder = builder.json(b);
        }
        let builder = self.auth.apply(builder).await?;
        Ok(builder.send().await?)
    }

    /// GET a collection; a 404 means the collection is empty.
    async fn get_collection<T: DeserializeOwned + Default>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> DirectoryResult<T> {
        let response = self.send(Method::GET, url, None::<&()>).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(operation, "Collection not found, treating as empty");
            return Ok(T::default());
        }
        self.handle_response(operation, response).await
    }

    /// POST/DELETE without a meaningful response body. A 404 means the
    /// target is already gone and counts as success.
    async fn execute_idempotent<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> DirectoryResult<()> {
        let response = self.send(method, url, body).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            debug!(operation, "Target already gone, treating as success");
            return Ok(());
        }
        self.handle_error_response(operation, response).await
    }

    // ── Response Handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: reqwest::Response,
    ) -> DirectoryResult<T> {
        if response.status().is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            self.handle_error_response(operation, response).await
        }
    }

    async fn handle_error_response<T>(
        &self,
        operation: &'static str,
        response: reqwest::Response,
    ) -> DirectoryResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::CONFLICT => Err(DirectoryError::Conflict { operation, body }),
            StatusCode::UNAUTHORIZED => {
                warn!(operation, "Directory rejected credentials (401)");
                self.auth.invalidate_cache().await;
                Err(DirectoryError::Api {
                    operation,
                    status: status.as_u16(),
                    body,
                })
            }
            _ => Err(DirectoryError::Api {
                operation,
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl DirectoryGateway for TailnetClient {
    fn scope(&self) -> &str {
        &self.tailnet
    }

    #[instrument(skip(self), fields(tailnet = %self.tailnet))]
    async fn list_invitations(&self) -> DirectoryResult<Vec<Invitation>> {
        let url = self.tailnet_url("user-invites")?;
        self.get_collection("list user invites", url).await
    }

    #[instrument(skip(self), fields(tailnet = %self.tailnet))]
    async fn list_users(&self) -> DirectoryResult<Vec<User>> {
        let url = self.tailnet_url("users")?;
        let list: UserListResponse = self.get_collection("list users", url).await?;
        Ok(list.users)
    }

    #[instrument(skip(self), fields(tailnet = %self.tailnet))]
    async fn create_invitation(&self, email: &str, role: Role) -> DirectoryResult<Invitation> {
        const OPERATION: &str = "create user invite";
        let url = self.tailnet_url("user-invites")?;
        // The endpoint takes a batch; we always send exactly one invite.
        let body = [CreateInvitationRequest { email, role }];
        let response = self.send(Method::POST, url, Some(&body)).await?;
        let created: Vec<Invitation> = self.handle_response(OPERATION, response).await?;
        created
            .into_iter()
            .next()
            .ok_or(DirectoryError::EmptyResponse(OPERATION))
    }

    #[instrument(skip(self))]
    async fn delete_invitation(&self, invitation_id: &str) -> DirectoryResult<()> {
        let url = endpoint(&self.base_url, &["api", "v2", "user-invites", invitation_id])?;
        self.execute_idempotent("delete user invite", Method::DELETE, url, None::<&()>)
            .await
    }

    #[instrument(skip(self))]
    async fn mutate_user(&self, user_id: &str, mutation: UserMutation) -> DirectoryResult<()> {
        let url = endpoint(
            &self.base_url,
            &["api", "v2", "users", user_id, mutation.action()],
        )?;
        match mutation {
            UserMutation::SetRole(role) => {
                let body = UpdateRoleRequest { role };
                self.execute_idempotent(mutation.operation(), Method::POST, url, Some(&body))
                    .await
            }
            UserMutation::Suspend | UserMutation::Restore | UserMutation::Remove => {
                self.execute_idempotent(mutation.operation(), Method::POST, url, None::<&()>)
                    .await
            }
        }
    }
}

fn parse_base_url(raw: &str) -> DirectoryResult<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))?;
    if url.cannot_be_a_base() {
        return Err(DirectoryError::Config(format!(
            "base_url cannot be used as a base: {raw}"
        )));
    }
    Ok(url)
}

/// Append percent-escaped path segments to the base URL.
fn endpoint(base: &Url, segments: &[&str]) -> DirectoryResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DirectoryError::Config(format!("base_url cannot be used as a base: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
