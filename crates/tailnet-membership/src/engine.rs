//! Resolve, ensure and release a single identity's membership.

use std::future::Future;
use std::sync::Arc;

use tailnet_directory::{DirectoryGateway, DirectoryResult, Invitation};
use tracing::{debug, info, instrument, warn};

use crate::context::OperationContext;
use crate::desired::{DesiredMembership, RemovalPolicy};
use crate::error::{CallFailure, MembershipError, MembershipResult, READ_HINT};
use crate::identity::{LoginName, MembershipId};
use crate::plan::{plan_ensure, plan_release, PendingDrift, PlannedCall, ReleasePlan};
use crate::state::MembershipState;

const OP_RESOLVE: &str = "resolve";
const OP_ENSURE: &str = "ensure";
const OP_RELEASE: &str = "release";
const OP_IMPORT: &str = "import";

/// Result of a successful ensure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureOutcome {
    /// State observed after the writes, or the initial observation when
    /// nothing was written.
    pub state: MembershipState,
    /// Writes that went through, in order.
    pub applied: Vec<PlannedCall>,
    /// Differences on a pending invite that were left alone.
    pub drift: Vec<PendingDrift>,
}

/// Result of a successful release.
#[derive(Debug)]
pub enum ReleaseOutcome {
    AlreadyAbsent,
    InvitationDeleted { invitation_id: String },
    UserRemoved { user_id: String },
    /// The user was de-privileged and suspended. Steps the directory
    /// rejected are listed in `failures`; they do not fail the release.
    UserDowngraded {
        user_id: String,
        failures: Vec<CallFailure>,
    },
}

impl ReleaseOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ReleaseOutcome::AlreadyAbsent => "already-absent",
            ReleaseOutcome::InvitationDeleted { .. } => "invite-deleted",
            ReleaseOutcome::UserRemoved { .. } => "user-removed",
            ReleaseOutcome::UserDowngraded { .. } => "user-downgraded",
        }
    }
}

/// A membership picked up from a persisted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedMembership {
    pub id: MembershipId,
    pub state: MembershipState,
}

/// Reconciles one identity at a time against a directory.
///
/// Every operation starts from a fresh listing of invites and users. Writes
/// are issued strictly in sequence. Concurrent operations on the same
/// identity are not coordinated; the directory is the only arbiter.
#[derive(Clone)]
pub struct MembershipEngine {
    gateway: Arc<dyn DirectoryGateway>,
}

impl MembershipEngine {
    pub fn new(gateway: Arc<dyn DirectoryGateway>) -> Self {
        Self { gateway }
    }

    /// Tenant scope of the underlying directory.
    #[must_use]
    pub fn scope(&self) -> &str {
        self.gateway.scope()
    }

    /// The persisted identifier for `login` in this engine's scope.
    #[must_use]
    pub fn membership_id(&self, login: &LoginName) -> MembershipId {
        MembershipId::new(self.scope(), login.clone())
    }

    /// Current state of an identity.
    #[instrument(skip(self, ctx), fields(login = %login))]
    pub async fn resolve(
        &self,
        ctx: &OperationContext,
        login: &LoginName,
    ) -> MembershipResult<MembershipState> {
        self.observe(ctx, OP_RESOLVE, login, &[]).await
    }

    /// Converge an identity onto the desired role and suspension.
    ///
    /// An absent identity is invited; a failed invite aborts. A pending
    /// invite is left untouched and any difference is reported as drift. A
    /// user gets a role change then a suspension change; both are attempted
    /// and failures are returned together as [`MembershipError::PartialApply`].
    #[instrument(
        skip_all,
        fields(login = %desired.login_name, role = %desired.role, suspended = desired.suspended)
    )]
    pub async fn ensure(
        &self,
        ctx: &OperationContext,
        desired: &DesiredMembership,
    ) -> MembershipResult<EnsureOutcome> {
        let login = desired.validate()?;
        let observed = self.observe(ctx, OP_ENSURE, &login, &[]).await?;
        let plan = plan_ensure(&observed, &login, desired);

        for drift in &plan.drift {
            warn!(state = observed.label(), %drift, "Pending invite differs from desired state");
        }

        if plan.is_noop() {
            debug!(state = observed.label(), "Membership already converged");
            return Ok(EnsureOutcome {
                state: observed,
                applied: Vec::new(),
                drift: plan.drift,
            });
        }

        let mut applied = Vec::new();
        let mut failures = Vec::new();
        let mut created = None;

        for call in plan.calls {
            match self.apply(ctx, OP_ENSURE, &applied, &call).await? {
                Ok(invitation) => {
                    info!(%call, "Applied");
                    if invitation.is_some() {
                        created = invitation;
                    }
                    applied.push(call);
                }
                Err(error) => {
                    if matches!(call, PlannedCall::CreateInvitation { .. }) {
                        return Err(MembershipError::from_directory(error, call.hint()));
                    }
                    warn!(%call, error = %error, "User mutation failed, continuing");
                    failures.push(CallFailure::new(call, error));
                }
            }
        }

        if !failures.is_empty() {
            return Err(MembershipError::PartialApply { applied, failures });
        }

        let state = match (self.observe(ctx, OP_ENSURE, &login, &applied).await?, created) {
            // The listing can lag behind a fresh invite.
            (MembershipState::Absent, Some(invitation)) => MembershipState::Pending(invitation),
            (state, _) => state,
        };

        Ok(EnsureOutcome {
            state,
            applied,
            drift: plan.drift,
        })
    }

    /// Tear a membership down.
    ///
    /// Absent is a no-op. A pending invite is deleted. A user is removed, or
    /// under [`RemovalPolicy::Downgrade`] set to the lowest role and suspended
    /// with failures logged instead of returned. An interruption always
    /// surfaces.
    #[instrument(skip(self, ctx), fields(login = %login))]
    pub async fn release(
        &self,
        ctx: &OperationContext,
        login: &LoginName,
        policy: RemovalPolicy,
    ) -> MembershipResult<ReleaseOutcome> {
        let observed = self.observe(ctx, OP_RELEASE, login, &[]).await?;
        let ReleasePlan { calls, best_effort } = plan_release(&observed, policy);

        let mut applied = Vec::new();
        let mut failures = Vec::new();

        for call in calls {
            match self.apply(ctx, OP_RELEASE, &applied, &call).await? {
                Ok(_) => {
                    info!(%call, "Applied");
                    applied.push(call);
                }
                Err(error) if best_effort => {
                    warn!(%call, error = %error, hint = call.hint(), "Downgrade step failed, continuing teardown");
                    failures.push(CallFailure::new(call, error));
                }
                Err(error) => return Err(MembershipError::from_directory(error, call.hint())),
            }
        }

        Ok(match observed {
            MembershipState::Absent => {
                debug!("Membership already absent");
                ReleaseOutcome::AlreadyAbsent
            }
            MembershipState::Pending(invitation) => ReleaseOutcome::InvitationDeleted {
                invitation_id: invitation.id,
            },
            MembershipState::Resolved(user) => match policy {
                RemovalPolicy::Remove => ReleaseOutcome::UserRemoved { user_id: user.id },
                RemovalPolicy::Downgrade => ReleaseOutcome::UserDowngraded {
                    user_id: user.id,
                    failures,
                },
            },
        })
    }

    /// Resolve the membership named by a persisted `scope:login` identifier.
    ///
    /// A malformed identifier fails before any remote call.
    #[instrument(skip(self, ctx))]
    pub async fn import(
        &self,
        ctx: &OperationContext,
        raw_id: &str,
    ) -> MembershipResult<ImportedMembership> {
        let id: MembershipId = raw_id.parse()?;

        if id.scope() != self.scope() {
            warn!(
                id_scope = id.scope(),
                scope = self.scope(),
                "Identifier scope differs from the configured tailnet, resolving in the configured one"
            );
        }

        let state = self.observe(ctx, OP_IMPORT, id.login_name(), &[]).await?;
        Ok(ImportedMembership { id, state })
    }

    /// List users then invites and match the identity.
    async fn observe(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        login: &LoginName,
        applied: &[PlannedCall],
    ) -> MembershipResult<MembershipState> {
        let users = guarded(ctx, operation, applied, self.gateway.list_users())
            .await?
            .map_err(|e| MembershipError::from_directory(e, READ_HINT))?;
        let invitations = guarded(ctx, operation, applied, self.gateway.list_invitations())
            .await?
            .map_err(|e| MembershipError::from_directory(e, READ_HINT))?;

        let state = MembershipState::from_listings(login, &invitations, &users);
        debug!(
            state = state.label(),
            users = users.len(),
            invitations = invitations.len(),
            "Resolved membership"
        );
        Ok(state)
    }

    /// Issue one planned call. The outer result carries interruption, the
    /// inner one the directory's answer.
    async fn apply(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        applied: &[PlannedCall],
        call: &PlannedCall,
    ) -> MembershipResult<DirectoryResult<Option<Invitation>>> {
        let result = match call {
            PlannedCall::CreateInvitation { login_name, role } => {
                guarded(
                    ctx,
                    operation,
                    applied,
                    self.gateway.create_invitation(login_name, *role),
                )
                .await?
                .map(Some)
            }
            PlannedCall::DeleteInvitation { invitation_id } => {
                guarded(
                    ctx,
                    operation,
                    applied,
                    self.gateway.delete_invitation(invitation_id),
                )
                .await?
                .map(|()| None)
            }
            PlannedCall::MutateUser { user_id, mutation } => {
                guarded(
                    ctx,
                    operation,
                    applied,
                    self.gateway.mutate_user(user_id, *mutation),
                )
                .await?
                .map(|()| None)
            }
        };
        Ok(result)
    }
}

/// Race a remote call against the context.
async fn guarded<T, F>(
    ctx: &OperationContext,
    operation: &'static str,
    applied: &[PlannedCall],
    call: F,
) -> MembershipResult<DirectoryResult<T>>
where
    F: Future<Output = DirectoryResult<T>>,
{
    ctx.run(call).await.map_err(|interruption| {
        warn!(operation, %interruption, applied = applied.len(), "Operation interrupted");
        MembershipError::Incomplete {
            operation,
            applied: applied.to_vec(),
            interruption,
        }
    })
}
