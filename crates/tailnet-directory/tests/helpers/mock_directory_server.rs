//! Mock directory API using wiremock.
//!
//! Mounts canned responses for the user, user invite, and user action
//! endpoints of a single tailnet.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tailnet_directory::auth::DirectoryAuth;
use tailnet_directory::client::TailnetClient;
use tailnet_directory::config::DirectoryCredentials;

pub const TAILNET: &str = "example.com";
pub const API_KEY: &str = "tskey-api-test";

/// Test data factory for a user record.
pub fn user_json(id: &str, login_name: &str, role: &str, status: &str) -> Value {
    json!({
        "id": id,
        "displayName": login_name.split('@').next().unwrap_or(login_name),
        "loginName": login_name,
        "role": role,
        "status": status,
        "created": "2024-01-15T10:00:00Z",
        "lastSeen": "2024-02-01T08:30:00Z"
    })
}

/// Test data factory for a pending invite.
pub fn invite_json(id: &str, email: &str, role: &str) -> Value {
    json!({ "id": id, "email": email, "role": role })
}

/// A mock directory server for one tailnet.
pub struct MockDirectoryServer {
    pub server: MockServer,
}

impl MockDirectoryServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client authenticating with the test API key.
    pub fn client(&self) -> TailnetClient {
        self.client_with(DirectoryCredentials::ApiKey {
            key: API_KEY.to_string(),
        })
    }

    /// Client authenticating with the given credentials.
    pub fn client_with(&self, credentials: DirectoryCredentials) -> TailnetClient {
        let auth = DirectoryAuth::new(
            credentials,
            format!("{}/api/v2/oauth/token", self.uri()),
            reqwest::Client::new(),
        );
        TailnetClient::with_http_client(&self.uri(), TAILNET, auth, reqwest::Client::new())
            .expect("mock server uri is a valid base url")
    }

    pub fn users_path() -> String {
        format!("/api/v2/tailnet/{TAILNET}/users")
    }

    pub fn invites_path() -> String {
        format!("/api/v2/tailnet/{TAILNET}/user-invites")
    }

    pub async fn mock_users(&self, users: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(Self::users_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_invites(&self, invites: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(Self::invites_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(invites)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_invite(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(Self::invites_path()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete_invite(&self, invite_id: &str, status: u16) {
        Mock::given(method("DELETE"))
            .and(path(format!("/api/v2/user-invites/{invite_id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mount a user action endpoint (`role`, `suspend`, `restore`, `delete`).
    pub async fn mock_user_action(&self, user_id: &str, action: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path(format!("/api/v2/users/{user_id}/{action}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(if status >= 400 {
                r#"{"message":"action rejected"}"#
            } else {
                "{}"
            }))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_token_endpoint(&self, access_token: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path("/api/v2/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": expires_in
            })))
            .mount(&self.server)
            .await;
    }

    /// Every request the server has received, as "METHOD /path".
    pub async fn requests(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}
