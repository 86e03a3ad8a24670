//! Release command - Tear a membership down

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tailnet_membership::{
    plan_release, LoginName, MembershipEngine, OperationContext, ReleaseOutcome, RemovalPolicy,
};

use crate::commands::load_desired;
use crate::error::CliResult;
use crate::output::{print_success, print_warning, MembershipOutput};

/// Arguments for the release command
#[derive(Args)]
pub struct ReleaseArgs {
    /// Login name (email) of the identity
    #[arg(required_unless_present = "file")]
    pub login_name: Option<String>,

    /// Demote to member and suspend instead of removing the user
    #[arg(long)]
    pub downgrade: bool,

    /// Read the login name and removal policy from a YAML file
    #[arg(long, short = 'f', conflicts_with_all = ["login_name", "downgrade"])]
    pub file: Option<PathBuf>,

    /// Show the planned writes without issuing them
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReleaseArgs {
    fn target(&self) -> CliResult<(LoginName, RemovalPolicy)> {
        if let Some(path) = &self.file {
            let desired = load_desired(path)?;
            return Ok((desired.validate()?, desired.removal_policy()));
        }
        let login = LoginName::new(self.login_name.as_deref().unwrap_or_default())?;
        let policy = if self.downgrade {
            RemovalPolicy::Downgrade
        } else {
            RemovalPolicy::Remove
        };
        Ok((login, policy))
    }
}

/// JSON output for release
#[derive(Serialize)]
struct ReleaseOutput {
    id: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    invite_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<String>,
    #[serde(skip)]
    message: String,
}

impl ReleaseOutput {
    fn new(id: String, outcome: &ReleaseOutcome) -> Self {
        let mut output = Self {
            id,
            outcome: outcome.label(),
            invite_id: None,
            user_id: None,
            failures: Vec::new(),
            message: String::new(),
        };
        output.message = match outcome {
            ReleaseOutcome::AlreadyAbsent => format!("{} is already absent", output.id),
            ReleaseOutcome::InvitationDeleted { invitation_id } => {
                output.invite_id = Some(invitation_id.clone());
                format!("Deleted pending invite for {}", output.id)
            }
            ReleaseOutcome::UserRemoved { user_id } => {
                output.user_id = Some(user_id.clone());
                format!("Removed user {}", output.id)
            }
            ReleaseOutcome::UserDowngraded { user_id, failures } => {
                output.user_id = Some(user_id.clone());
                output.failures = failures.iter().map(ToString::to_string).collect();
                format!("Demoted and suspended user {}", output.id)
            }
        };
        output
    }
}

/// Execute the release command
pub async fn execute(
    args: ReleaseArgs,
    engine: &MembershipEngine,
    ctx: &OperationContext,
) -> CliResult<()> {
    let (login, policy) = args.target()?;
    let id = engine.membership_id(&login);

    if args.dry_run {
        let observed = engine.resolve(ctx, &login).await?;
        let plan = plan_release(&observed, policy);
        return MembershipOutput::new(&id, &observed)
            .with_planned(&plan.calls)
            .print(args.json);
    }

    let outcome = engine.release(ctx, &login, policy).await?;
    let output = ReleaseOutput::new(id.to_string(), &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for failure in &output.failures {
        print_warning(failure);
    }
    print_success(&output.message);
    Ok(())
}
