//! Observed membership state.

use std::fmt;

use tailnet_directory::{Invitation, User};

use crate::identity::LoginName;

/// Sub-state of a membership backed by a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Active,
    Disabled,
}

impl Standing {
    #[must_use]
    pub fn of(user: &User) -> Self {
        if user.status.is_suspended() {
            Standing::Disabled
        } else {
            Standing::Active
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Active => "active",
            Standing::Disabled => "disabled",
        }
    }
}

/// Where an identity currently stands in the tailnet.
///
/// Never stored: every resolve derives it from fresh listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipState {
    /// Neither an invite nor a user matches the identity.
    Absent,
    /// A pending invite matches the identity.
    Pending(Invitation),
    /// A user record matches the identity.
    Resolved(User),
}

impl MembershipState {
    /// Match an identity against both listings.
    ///
    /// An invite match takes precedence over a user match. The two should
    /// never coexist for one identity; the first match of each kind is used.
    #[must_use]
    pub fn from_listings(login: &LoginName, invitations: &[Invitation], users: &[User]) -> Self {
        if let Some(invitation) = invitations.iter().find(|i| login.matches(&i.email)) {
            return MembershipState::Pending(invitation.clone());
        }
        if let Some(user) = users.iter().find(|u| login.matches(&u.login_name)) {
            return MembershipState::Resolved(user.clone());
        }
        MembershipState::Absent
    }

    /// `absent`, `pending`, `active` or `disabled`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MembershipState::Absent => "absent",
            MembershipState::Pending(_) => "pending",
            MembershipState::Resolved(user) => Standing::of(user).as_str(),
        }
    }

    #[must_use]
    pub fn standing(&self) -> Option<Standing> {
        match self {
            MembershipState::Resolved(user) => Some(Standing::of(user)),
            _ => None,
        }
    }

    /// Role of the invite or the user, as reported by the remote.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        match self {
            MembershipState::Absent => None,
            MembershipState::Pending(invitation) => Some(invitation.role.as_str()),
            MembershipState::Resolved(user) => Some(user.role.as_str()),
        }
    }

    #[must_use]
    pub fn invitation_id(&self) -> Option<&str> {
        match self {
            MembershipState::Pending(invitation) => Some(invitation.id.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            MembershipState::Resolved(user) => Some(user.id.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, MembershipState::Absent)
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.standing() == Some(Standing::Disabled)
    }
}

impl fmt::Display for MembershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipState::Absent => f.write_str("absent"),
            MembershipState::Pending(invitation) => {
                write!(f, "pending (invite {}, role {})", invitation.id, invitation.role)
            }
            MembershipState::Resolved(user) => write!(
                f,
                "{} (user {}, role {})",
                Standing::of(user).as_str(),
                user.id,
                user.role
            ),
        }
    }
}
