//! Error types for membership reconciliation.

use std::fmt;

use tailnet_directory::DirectoryError;
use thiserror::Error;

use crate::context::Interruption;
use crate::plan::PlannedCall;

/// Result type alias using `MembershipError`.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Hint attached to failed list calls.
pub const READ_HINT: &str = "ensure your credentials can read users and user invites in this tailnet";

/// Hint attached to invite creation and deletion failures.
pub const INVITE_HINT: &str = "ensure your token has UserInvites scope and the identity is valid";

/// Hint attached to failed user mutations.
pub const USER_HINT: &str = "ensure you are not the last admin or account owner";

/// Hint attached to a rejected invite creation.
pub const CONFLICT_HINT: &str =
    "the identity may already be a member or have a pending invite; resolve it before retrying";

/// Hint attached to credential failures, whatever the call.
pub const AUTH_HINT: &str = "check the API key or OAuth client credentials";

/// Errors surfaced by the membership engine.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// A persisted identifier could not be split into scope and login.
    #[error("invalid membership id '{0}' (expected <tailnet>:<login_name>)")]
    MalformedIdentifier(String),

    /// The login name is not usable as an identity.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// The desired state could not be loaded or failed validation.
    #[error("invalid desired state: {0}")]
    InvalidDesiredState(String),

    /// A directory call failed.
    #[error("{source} (hint: {hint})")]
    Directory {
        hint: &'static str,
        source: DirectoryError,
    },

    /// The directory refused to create an invitation.
    #[error("{source} (hint: {hint})")]
    Conflict {
        hint: &'static str,
        source: DirectoryError,
    },

    /// Some user mutations failed after every independent mutation was tried.
    #[error(
        "{} of {} user mutation(s) failed: {}",
        .failures.len(),
        .failures.len() + .applied.len(),
        join_failures(.failures)
    )]
    PartialApply {
        applied: Vec<PlannedCall>,
        failures: Vec<CallFailure>,
    },

    /// The operation was interrupted; the remote is left as it is.
    #[error("{operation} incomplete after {} applied call(s): {interruption}", .applied.len())]
    Incomplete {
        operation: &'static str,
        applied: Vec<PlannedCall>,
        interruption: Interruption,
    },
}

impl MembershipError {
    /// Wrap a directory failure with a hint for the step that produced it.
    ///
    /// Conflicts and credential failures carry their own hints.
    #[must_use]
    pub fn from_directory(source: DirectoryError, hint: &'static str) -> Self {
        match source {
            source @ DirectoryError::Conflict { .. } => Self::Conflict {
                hint: CONFLICT_HINT,
                source,
            },
            source @ DirectoryError::Auth(_) => Self::Directory {
                hint: AUTH_HINT,
                source,
            },
            source => Self::Directory { hint, source },
        }
    }

    /// The hint for the likely remote precondition, when there is one.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Directory { hint, .. } | Self::Conflict { hint, .. } => Some(*hint),
            Self::PartialApply { failures, .. } => failures.first().map(|f| f.hint),
            _ => None,
        }
    }

    /// Remote calls that went through before the error.
    #[must_use]
    pub fn applied(&self) -> &[PlannedCall] {
        match self {
            Self::PartialApply { applied, .. } | Self::Incomplete { applied, .. } => applied,
            _ => &[],
        }
    }

    /// Whether the input was rejected before any remote call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedIdentifier(_) | Self::InvalidIdentity(_) | Self::InvalidDesiredState(_)
        )
    }

    /// Whether a cancellation or deadline cut the operation short.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}

/// A planned call that the directory rejected.
#[derive(Debug)]
pub struct CallFailure {
    pub call: PlannedCall,
    pub hint: &'static str,
    pub error: DirectoryError,
}

impl CallFailure {
    #[must_use]
    pub fn new(call: PlannedCall, error: DirectoryError) -> Self {
        let hint = match &error {
            DirectoryError::Auth(_) => AUTH_HINT,
            _ => call.hint(),
        };
        Self { call, hint, error }
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (hint: {})", self.call, self.error, self.hint)
    }
}

fn join_failures(failures: &[CallFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailnet_directory::{Role, UserMutation};

    fn api_error(operation: &'static str, status: u16) -> DirectoryError {
        DirectoryError::Api {
            operation,
            status,
            body: "denied".to_string(),
        }
    }

    #[test]
    fn test_from_directory_keeps_step_hint() {
        let err = MembershipError::from_directory(api_error("list users", 403), READ_HINT);
        assert_eq!(err.hint(), Some(READ_HINT));
        assert_eq!(
            err.to_string(),
            format!("list users: HTTP 403: denied (hint: {READ_HINT})")
        );
    }

    #[test]
    fn test_from_directory_maps_conflict() {
        let source = DirectoryError::Conflict {
            operation: "create user invite",
            body: "exists".to_string(),
        };
        let err = MembershipError::from_directory(source, INVITE_HINT);
        assert!(matches!(err, MembershipError::Conflict { .. }));
        assert_eq!(err.hint(), Some(CONFLICT_HINT));
    }

    #[test]
    fn test_from_directory_auth_hint() {
        let err = MembershipError::from_directory(
            DirectoryError::Auth("bad secret".to_string()),
            USER_HINT,
        );
        assert_eq!(err.hint(), Some(AUTH_HINT));
    }

    #[test]
    fn test_partial_apply_message_lists_failures() {
        let failure = CallFailure::new(
            PlannedCall::MutateUser {
                user_id: "u1".to_string(),
                mutation: UserMutation::SetRole(Role::Admin),
            },
            api_error("update user role", 400),
        );
        let err = MembershipError::PartialApply {
            applied: vec![PlannedCall::MutateUser {
                user_id: "u1".to_string(),
                mutation: UserMutation::Suspend,
            }],
            failures: vec![failure],
        };

        let message = err.to_string();
        assert!(message.starts_with("1 of 2 user mutation(s) failed"));
        assert!(message.contains(USER_HINT));
        assert_eq!(err.applied().len(), 1);
        assert_eq!(err.hint(), Some(USER_HINT));
    }

    #[test]
    fn test_incomplete_message() {
        let err = MembershipError::Incomplete {
            operation: "ensure",
            applied: vec![],
            interruption: Interruption::DeadlineExceeded,
        };
        assert!(err.is_incomplete());
        assert_eq!(
            err.to_string(),
            "ensure incomplete after 0 applied call(s): deadline exceeded"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(MembershipError::MalformedIdentifier("x".to_string()).is_validation());
        assert!(!MembershipError::from_directory(api_error("list users", 500), READ_HINT)
            .is_validation());
    }
}
