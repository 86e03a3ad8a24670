//! Desired membership state supplied by the caller.

use serde::{Deserialize, Serialize};
use tailnet_directory::Role;

use crate::error::{MembershipError, MembershipResult};
use crate::identity::LoginName;

/// Upper bound on the login name length, in characters.
pub const MAX_LOGIN_NAME_LEN: usize = 256;

/// What happens to a user record when the membership is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Delete the user from the tailnet.
    #[default]
    Remove,
    /// Set the lowest-privilege role and suspend, best effort.
    Downgrade,
}

/// The membership a caller wants to exist.
///
/// ```yaml
/// login_name: bob@example.com
/// role: admin
/// suspended: false
/// downgrade_on_destroy: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredMembership {
    pub login_name: String,

    #[serde(default)]
    pub role: Role,

    #[serde(default)]
    pub suspended: bool,

    #[serde(default)]
    pub downgrade_on_destroy: bool,
}

impl DesiredMembership {
    /// An active `member` that is removed on release.
    #[must_use]
    pub fn new(login_name: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
            role: Role::default(),
            suspended: false,
            downgrade_on_destroy: false,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_suspended(mut self, suspended: bool) -> Self {
        self.suspended = suspended;
        self
    }

    #[must_use]
    pub fn with_downgrade_on_destroy(mut self, downgrade: bool) -> Self {
        self.downgrade_on_destroy = downgrade;
        self
    }

    /// Parse a YAML document and validate it.
    pub fn from_yaml(content: &str) -> MembershipResult<Self> {
        let desired: Self = serde_yaml::from_str(content)
            .map_err(|e| MembershipError::InvalidDesiredState(e.to_string()))?;
        desired.validate()?;
        Ok(desired)
    }

    /// Check the login name length and return it normalized.
    pub fn validate(&self) -> MembershipResult<LoginName> {
        let len = self.login_name.trim().chars().count();
        if len == 0 || len > MAX_LOGIN_NAME_LEN {
            return Err(MembershipError::InvalidDesiredState(format!(
                "login_name must be between 1 and {MAX_LOGIN_NAME_LEN} characters, got {len}"
            )));
        }
        LoginName::new(&self.login_name)
    }

    #[must_use]
    pub fn removal_policy(&self) -> RemovalPolicy {
        if self.downgrade_on_destroy {
            RemovalPolicy::Downgrade
        } else {
            RemovalPolicy::Remove
        }
    }
}
