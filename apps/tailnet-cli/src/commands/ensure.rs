//! Ensure command - Converge an identity onto the desired membership

use std::path::PathBuf;

use clap::Args;
use tailnet_directory::Role;
use tailnet_membership::{plan_ensure, DesiredMembership, MembershipEngine, OperationContext};

use crate::commands::load_desired;
use crate::error::CliResult;
use crate::output::{print_warning, MembershipOutput};

/// Arguments for the ensure command
#[derive(Args)]
pub struct EnsureArgs {
    /// Login name (email) of the identity
    #[arg(required_unless_present = "file")]
    pub login_name: Option<String>,

    /// Role to assign (member or admin)
    #[arg(long, default_value_t = Role::Member)]
    pub role: Role,

    /// Keep the user suspended
    #[arg(long)]
    pub suspended: bool,

    /// Read the desired membership from a YAML file
    #[arg(long, short = 'f', conflicts_with_all = ["login_name", "role", "suspended"])]
    pub file: Option<PathBuf>,

    /// Show the planned writes without issuing them
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl EnsureArgs {
    fn desired(&self) -> CliResult<DesiredMembership> {
        if let Some(path) = &self.file {
            return load_desired(path);
        }
        let login_name = self.login_name.clone().unwrap_or_default();
        Ok(DesiredMembership::new(login_name)
            .with_role(self.role)
            .with_suspended(self.suspended))
    }
}

/// Execute the ensure command
pub async fn execute(
    args: EnsureArgs,
    engine: &MembershipEngine,
    ctx: &OperationContext,
) -> CliResult<()> {
    let desired = args.desired()?;
    let login = desired.validate()?;
    let id = engine.membership_id(&login);

    if args.dry_run {
        let observed = engine.resolve(ctx, &login).await?;
        let plan = plan_ensure(&observed, &login, &desired);
        for drift in &plan.drift {
            print_warning(&drift.to_string());
        }
        return MembershipOutput::new(&id, &observed)
            .with_planned(&plan.calls)
            .with_drift(&plan.drift)
            .print(args.json);
    }

    let outcome = engine.ensure(ctx, &desired).await?;
    for drift in &outcome.drift {
        print_warning(&drift.to_string());
    }

    MembershipOutput::new(&id, &outcome.state)
        .with_applied(&outcome.applied)
        .with_drift(&outcome.drift)
        .print(args.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: EnsureArgs,
    }

    #[test]
    fn test_args_from_flags() {
        let cli = TestCli::parse_from(["test", "Bob@X.com", "--role", "admin", "--suspended"]);
        let desired = cli.args.desired().unwrap();

        assert_eq!(desired.login_name, "Bob@X.com");
        assert_eq!(desired.role, Role::Admin);
        assert!(desired.suspended);
    }

    #[test]
    fn test_args_default_role() {
        let cli = TestCli::parse_from(["test", "bob@x.com"]);
        assert_eq!(cli.args.desired().unwrap().role, Role::Member);
    }

    #[test]
    fn test_args_require_login_or_file() {
        assert!(TestCli::try_parse_from(["test"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--file", "m.yaml", "bob@x.com"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--role", "owner", "bob@x.com"]).is_err());
    }
}
