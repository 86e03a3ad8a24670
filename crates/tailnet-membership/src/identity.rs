//! Login identities and the persisted membership identifier.

use std::fmt;
use std::str::FromStr;

use tailnet_directory::DEFAULT_TAILNET;

use crate::error::{MembershipError, MembershipResult};

/// Separator between tenant scope and login in a [`MembershipId`].
pub const ID_SEPARATOR: char = ':';

/// Normalize a login handle: trim surrounding whitespace and case-fold.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A normalized login identity, the join key between invites and users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginName(String);

impl LoginName {
    /// Normalize `raw`, rejecting a value that is empty after trimming.
    pub fn new(raw: &str) -> MembershipResult<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(MembershipError::InvalidIdentity(
                "login name is empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a remote field (invite email, user login name) names this identity.
    #[must_use]
    pub fn matches(&self, remote: &str) -> bool {
        normalize(remote) == self.0
    }
}

impl fmt::Display for LoginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LoginName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// External identifier of a membership: `scope:login`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipId {
    scope: String,
    login_name: LoginName,
}

impl MembershipId {
    /// Build an identifier; an empty scope becomes the default tailnet.
    #[must_use]
    pub fn new(scope: &str, login_name: LoginName) -> Self {
        let scope = scope.trim();
        let scope = if scope.is_empty() {
            DEFAULT_TAILNET
        } else {
            scope
        };
        Self {
            scope: scope.to_string(),
            login_name,
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    #[must_use]
    pub fn login_name(&self) -> &LoginName {
        &self.login_name
    }
}

impl fmt::Display for MembershipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, ID_SEPARATOR, self.login_name)
    }
}

impl FromStr for MembershipId {
    type Err = MembershipError;

    /// Split on the first separator. The separator must be present and
    /// neither the first nor the last character. The scope is trimmed the
    /// same way [`MembershipId::new`] trims it and must not be blank.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MembershipError::MalformedIdentifier(s.to_string());
        let idx = s.find(ID_SEPARATOR).ok_or_else(malformed)?;
        if idx == 0 || idx + ID_SEPARATOR.len_utf8() >= s.len() {
            return Err(malformed());
        }
        let scope = s[..idx].trim();
        if scope.is_empty() {
            return Err(malformed());
        }
        let login = &s[idx + ID_SEPARATOR.len_utf8()..];
        let login_name = LoginName::new(login).map_err(|_| malformed())?;
        Ok(Self::new(scope, login_name))
    }
}
