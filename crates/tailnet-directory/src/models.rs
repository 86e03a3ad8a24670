//! Wire models for users, user invites, and user actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role that can be requested for a membership.
///
/// The remote knows more roles than these (owner, it-admin, auditor, ...);
/// those show up as plain strings on [`User::role`] and are never requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member. Lowest privilege.
    #[default]
    Member,
    /// Tailnet administrator.
    Admin,
}

impl Role {
    /// The role used when de-privileging a user.
    pub const LOWEST_PRIVILEGE: Role = Role::Member;

    /// Get the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    /// Whether a role string reported by the remote names this role.
    #[must_use]
    pub fn matches(&self, observed: &str) -> bool {
        observed.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}' (expected member or admin)")),
        }
    }
}

/// Account status of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    Active,
    Idle,
    Suspended,
    NeedsApproval,
    OverBillingLimit,
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    /// Only an explicit suspension counts as disabled.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self, UserStatus::Suspended)
    }
}

/// A user record in the tailnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub login_name: String,
    /// Free-form role string as reported by the remote.
    pub role: String,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// A pending, not-yet-accepted user invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// A write against an existing user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMutation {
    SetRole(Role),
    Suspend,
    Restore,
    Remove,
}

impl UserMutation {
    /// Operation name used in logs and error messages.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            UserMutation::SetRole(_) => "update user role",
            UserMutation::Suspend => "suspend user",
            UserMutation::Restore => "restore user",
            UserMutation::Remove => "delete user",
        }
    }

    /// Trailing path segment of the user action endpoint.
    pub(crate) fn action(&self) -> &'static str {
        match self {
            UserMutation::SetRole(_) => "role",
            UserMutation::Suspend => "suspend",
            UserMutation::Restore => "restore",
            UserMutation::Remove => "delete",
        }
    }
}

impl fmt::Display for UserMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserMutation::SetRole(role) => write!(f, "set role {role}"),
            UserMutation::Suspend => f.write_str("suspend"),
            UserMutation::Restore => f.write_str("restore"),
            UserMutation::Remove => f.write_str("remove"),
        }
    }
}

/// Envelope of the list users response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserListResponse {
    #[serde(default)]
    pub users: Vec<User>,
}

/// One entry of the create user invites request body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateInvitationRequest<'a> {
    pub email: &'a str,
    pub role: Role,
}

/// Body of the update user role request.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRoleRequest {
    pub role: Role,
}
