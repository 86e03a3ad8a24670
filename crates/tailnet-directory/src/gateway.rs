//! The directory operations the membership engine is built on.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::models::{Invitation, Role, User, UserMutation};

/// Minimal, uniform view of the remote directory.
///
/// Implementations issue exactly one remote call per method and never retry.
/// `delete_invitation` and `mutate_user` treat a missing target as success;
/// the list calls treat a missing collection as empty.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Tenant scope the collections are enumerated in.
    fn scope(&self) -> &str;

    /// List the pending invitations of the tenant.
    async fn list_invitations(&self) -> DirectoryResult<Vec<Invitation>>;

    /// List the active and suspended users of the tenant.
    async fn list_users(&self) -> DirectoryResult<Vec<User>>;

    /// Create a pending invitation for `email` with `role`.
    async fn create_invitation(&self, email: &str, role: Role) -> DirectoryResult<Invitation>;

    /// Delete a pending invitation.
    async fn delete_invitation(&self, invitation_id: &str) -> DirectoryResult<()>;

    /// Apply a single mutation to a user record.
    async fn mutate_user(&self, user_id: &str, mutation: UserMutation) -> DirectoryResult<()>;
}
