//! Pure diff of observed against desired state.
//!
//! The planner never talks to the directory. It turns a [`MembershipState`]
//! and a desired state into the ordered list of remote writes that converge
//! them, so the engine and dry runs share one source of truth.

use std::fmt;

use tailnet_directory::{Role, UserMutation};

use crate::desired::{DesiredMembership, RemovalPolicy};
use crate::error::{INVITE_HINT, USER_HINT};
use crate::identity::LoginName;
use crate::state::{MembershipState, Standing};

/// One remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedCall {
    CreateInvitation { login_name: String, role: Role },
    DeleteInvitation { invitation_id: String },
    MutateUser { user_id: String, mutation: UserMutation },
}

impl PlannedCall {
    /// Hint for the remote precondition this call depends on.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            PlannedCall::CreateInvitation { .. } | PlannedCall::DeleteInvitation { .. } => {
                INVITE_HINT
            }
            PlannedCall::MutateUser { .. } => USER_HINT,
        }
    }
}

impl fmt::Display for PlannedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedCall::CreateInvitation { login_name, role } => {
                write!(f, "invite {login_name} as {role}")
            }
            PlannedCall::DeleteInvitation { invitation_id } => {
                write!(f, "delete invite {invitation_id}")
            }
            PlannedCall::MutateUser { user_id, mutation } => {
                write!(f, "{mutation} on user {user_id}")
            }
        }
    }
}

/// A difference on a pending invite that is reported but not corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDrift {
    /// The invite carries another role than the desired one.
    Role { invited: String, desired: Role },
    /// Suspension was requested for an identity that has not joined yet.
    Suspension,
}

impl fmt::Display for PendingDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingDrift::Role { invited, desired } => write!(
                f,
                "pending invite has role '{invited}' but '{desired}' is desired; \
                 invites are not changed, release and ensure again to re-invite"
            ),
            PendingDrift::Suspension => f.write_str(
                "suspension is desired but the invite is not accepted yet; \
                 it applies once a user record exists",
            ),
        }
    }
}

/// Writes that bring an identity to the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnsurePlan {
    pub calls: Vec<PlannedCall>,
    pub drift: Vec<PendingDrift>,
}

impl EnsurePlan {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Writes that tear a membership down.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleasePlan {
    pub calls: Vec<PlannedCall>,
    /// Failures are logged and skipped instead of aborting.
    pub best_effort: bool,
}

/// Plan the writes for an ensure.
///
/// - absent: one invite with the desired role; suspension is ignored
/// - pending: nothing, differences become drift
/// - resolved: role change first, then suspend or restore
#[must_use]
pub fn plan_ensure(
    observed: &MembershipState,
    login: &LoginName,
    desired: &DesiredMembership,
) -> EnsurePlan {
    let mut plan = EnsurePlan::default();

    match observed {
        MembershipState::Absent => {
            plan.calls.push(PlannedCall::CreateInvitation {
                login_name: login.as_str().to_string(),
                role: desired.role,
            });
        }
        MembershipState::Pending(invitation) => {
            if !desired.role.matches(&invitation.role) {
                plan.drift.push(PendingDrift::Role {
                    invited: invitation.role.clone(),
                    desired: desired.role,
                });
            }
            if desired.suspended {
                plan.drift.push(PendingDrift::Suspension);
            }
        }
        MembershipState::Resolved(user) => {
            if !desired.role.matches(&user.role) {
                plan.calls.push(PlannedCall::MutateUser {
                    user_id: user.id.clone(),
                    mutation: UserMutation::SetRole(desired.role),
                });
            }
            let suspension = match (desired.suspended, Standing::of(user)) {
                (true, Standing::Active) => Some(UserMutation::Suspend),
                (false, Standing::Disabled) => Some(UserMutation::Restore),
                _ => None,
            };
            if let Some(mutation) = suspension {
                plan.calls.push(PlannedCall::MutateUser {
                    user_id: user.id.clone(),
                    mutation,
                });
            }
        }
    }

    plan
}

/// Plan the writes for a release.
///
/// A downgrade always issues both the role change and the suspension.
#[must_use]
pub fn plan_release(observed: &MembershipState, policy: RemovalPolicy) -> ReleasePlan {
    match observed {
        MembershipState::Absent => ReleasePlan::default(),
        MembershipState::Pending(invitation) => ReleasePlan {
            calls: vec![PlannedCall::DeleteInvitation {
                invitation_id: invitation.id.clone(),
            }],
            best_effort: false,
        },
        MembershipState::Resolved(user) => match policy {
            RemovalPolicy::Remove => ReleasePlan {
                calls: vec![PlannedCall::MutateUser {
                    user_id: user.id.clone(),
                    mutation: UserMutation::Remove,
                }],
                best_effort: false,
            },
            RemovalPolicy::Downgrade => ReleasePlan {
                calls: vec![
                    PlannedCall::MutateUser {
                        user_id: user.id.clone(),
                        mutation: UserMutation::SetRole(Role::LOWEST_PRIVILEGE),
                    },
                    PlannedCall::MutateUser {
                        user_id: user.id.clone(),
                        mutation: UserMutation::Suspend,
                    },
                ],
                best_effort: true,
            },
        },
    }
}
