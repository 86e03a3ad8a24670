//! Import command - Pick up an existing membership by its identifier

use clap::Args;
use tailnet_membership::{MembershipEngine, OperationContext};

use crate::error::{CliError, CliResult};
use crate::output::MembershipOutput;

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// Membership identifier, `<tailnet>:<login_name>`
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the import command
pub async fn execute(
    args: ImportArgs,
    engine: &MembershipEngine,
    ctx: &OperationContext,
) -> CliResult<()> {
    let imported = engine.import(ctx, &args.id).await?;

    if imported.state.is_absent() {
        return Err(CliError::NotFound(format!(
            "no invite or user matches {}",
            imported.id
        )));
    }

    MembershipOutput::new(&imported.id, &imported.state).print(args.json)
}
