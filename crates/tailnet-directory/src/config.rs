//! Directory client configuration.

use serde::{Deserialize, Serialize};
use std::env::VarError;

use crate::error::{DirectoryError, DirectoryResult};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tailscale.com";

/// Tailnet placeholder meaning "the tailnet the credential belongs to".
pub const DEFAULT_TAILNET: &str = "-";

/// Credentials used to authenticate against the directory API.
///
/// The [`Debug`] impl redacts secrets so they never reach log output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DirectoryCredentials {
    /// API access key, sent as the basic auth username.
    ApiKey { key: String },

    /// `OAuth2` client credentials grant.
    #[serde(rename = "oauth2")]
    OAuth2 {
        client_id: String,
        client_secret: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

impl std::fmt::Debug for DirectoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { .. } => f.debug_struct("ApiKey").field("key", &"[REDACTED]").finish(),
            Self::OAuth2 {
                client_id, scopes, ..
            } => f
                .debug_struct("OAuth2")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// Connection settings for the directory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// API base URL, without the `/api/v2` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Tenant scope the invitations and users are enumerated in.
    #[serde(default = "default_tailnet")]
    pub tailnet: String,

    /// Credentials; may be supplied later through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<DirectoryCredentials>,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_tailnet() -> String {
    DEFAULT_TAILNET.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("tailnet-directory/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tailnet: default_tailnet(),
            credentials: None,
            request_timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl DirectoryConfig {
    /// Create a configuration for the given tailnet with an API key.
    pub fn with_api_key(tailnet: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            tailnet: tailnet.into(),
            credentials: Some(DirectoryCredentials::ApiKey { key: key.into() }),
            ..Self::default()
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: DirectoryCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> DirectoryResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| DirectoryError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key));
    }

    /// Apply overrides from a custom variable reader.
    ///
    /// An API key wins over `OAuth2` client credentials when both are present.
    pub fn apply_overrides_from<F>(&mut self, reader: F)
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        if let Ok(base_url) = reader("TAILSCALE_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(tailnet) = reader("TAILSCALE_TAILNET") {
            self.tailnet = tailnet;
        }
        if let Ok(key) = reader("TAILSCALE_API_KEY") {
            self.credentials = Some(DirectoryCredentials::ApiKey { key });
        } else if let (Ok(client_id), Ok(client_secret)) = (
            reader("TAILSCALE_OAUTH_CLIENT_ID"),
            reader("TAILSCALE_OAUTH_CLIENT_SECRET"),
        ) {
            let scopes = reader("TAILSCALE_OAUTH_SCOPES")
                .map(|s| {
                    s.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            self.credentials = Some(DirectoryCredentials::OAuth2 {
                client_id,
                client_secret,
                scopes,
            });
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        let url = url::Url::parse(&self.base_url)?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(DirectoryError::Config(format!(
                "Unsupported scheme: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(DirectoryError::Config(format!(
                "base_url cannot be used as a base: {}",
                self.base_url
            )));
        }
        match &self.credentials {
            None => {
                return Err(DirectoryError::Config(
                    "credentials are required (api key or oauth2 client)".to_string(),
                ))
            }
            Some(DirectoryCredentials::ApiKey { key }) if key.trim().is_empty() => {
                return Err(DirectoryError::Config("api key is empty".to_string()))
            }
            Some(DirectoryCredentials::OAuth2 {
                client_id,
                client_secret,
                ..
            }) if client_id.trim().is_empty() || client_secret.trim().is_empty() => {
                return Err(DirectoryError::Config(
                    "oauth2 client_id and client_secret are required".to_string(),
                ))
            }
            Some(_) => {}
        }
        if self.request_timeout_secs == 0 {
            return Err(DirectoryError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The tailnet scope, with an empty value read as the default placeholder.
    #[must_use]
    pub fn scope(&self) -> &str {
        let tailnet = self.tailnet.trim();
        if tailnet.is_empty() {
            DEFAULT_TAILNET
        } else {
            tailnet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reader(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = DirectoryConfig::from_yaml("tailnet: example.com\n").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tailnet, "example.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_parse_oauth_credentials() {
        let yaml = r#"
tailnet: example.com
credentials:
  type: oauth2
  client_id: k123
  client_secret: tskey-client-secret
  scopes: [users, user_invites]
"#;
        let config = DirectoryConfig::from_yaml(yaml).unwrap();
        match config.credentials {
            Some(DirectoryCredentials::OAuth2 { client_id, scopes, .. }) => {
                assert_eq!(client_id, "k123");
                assert_eq!(scopes, vec!["users", "user_invites"]);
            }
            other => panic!("unexpected credentials: {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides_prefer_api_key() {
        let mut config = DirectoryConfig::default();
        config.apply_overrides_from(reader(&[
            ("TAILSCALE_TAILNET", "example.com"),
            ("TAILSCALE_API_KEY", "tskey-api-1"),
            ("TAILSCALE_OAUTH_CLIENT_ID", "id"),
            ("TAILSCALE_OAUTH_CLIENT_SECRET", "secret"),
        ]));
        assert_eq!(config.tailnet, "example.com");
        assert!(matches!(
            config.credentials,
            Some(DirectoryCredentials::ApiKey { ref key }) if key == "tskey-api-1"
        ));
    }

    #[test]
    fn test_env_overrides_oauth_scopes() {
        let mut config = DirectoryConfig::default();
        config.apply_overrides_from(reader(&[
            ("TAILSCALE_OAUTH_CLIENT_ID", "id"),
            ("TAILSCALE_OAUTH_CLIENT_SECRET", "secret"),
            ("TAILSCALE_OAUTH_SCOPES", "users, user_invites,"),
        ]));
        match config.credentials {
            Some(DirectoryCredentials::OAuth2 { scopes, .. }) => {
                assert_eq!(scopes, vec!["users", "user_invites"]);
            }
            other => panic!("unexpected credentials: {other:?}"),
        }
    }

    #[test]
    fn test_validation() {
        let config = DirectoryConfig::with_api_key("example.com", "tskey");
        assert!(config.validate().is_ok());

        assert!(DirectoryConfig::default().validate().is_err());
        assert!(DirectoryConfig::with_api_key("example.com", " ").validate().is_err());
        assert!(DirectoryConfig::with_api_key("example.com", "k")
            .with_base_url("ftp://example.com")
            .validate()
            .is_err());
        assert!(DirectoryConfig::with_api_key("example.com", "k")
            .with_base_url("not a url")
            .validate()
            .is_err());
    }

    #[test]
    fn test_scope_defaults_when_empty() {
        let config = DirectoryConfig::with_api_key("", "k");
        assert_eq!(config.scope(), DEFAULT_TAILNET);
        let config = DirectoryConfig::with_api_key("example.com", "k");
        assert_eq!(config.scope(), "example.com");
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = DirectoryCredentials::ApiKey {
            key: "tskey-secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("tskey-secret"));
        assert!(debug.contains("[REDACTED]"));

        let creds = DirectoryCredentials::OAuth2 {
            client_id: "client".to_string(),
            client_secret: "very-secret".to_string(),
            scopes: vec![],
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("client"));
        assert!(!debug.contains("very-secret"));
    }
}
