//! Resolve command - Show where an identity stands

use clap::Args;
use tailnet_membership::{LoginName, MembershipEngine, OperationContext};

use crate::error::CliResult;
use crate::output::MembershipOutput;

/// Arguments for the resolve command
#[derive(Args)]
pub struct ResolveArgs {
    /// Login name (email) of the identity
    pub login_name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the resolve command
pub async fn execute(
    args: ResolveArgs,
    engine: &MembershipEngine,
    ctx: &OperationContext,
) -> CliResult<()> {
    let login = LoginName::new(&args.login_name)?;
    let state = engine.resolve(ctx, &login).await?;

    MembershipOutput::new(&engine.membership_id(&login), &state).print(args.json)
}
