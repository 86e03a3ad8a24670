//! tailnet-membership CLI - Reconcile a single identity's tailnet membership
//!
//! This CLI enables operators to:
//! - Resolve an identity to absent, pending, active or disabled
//! - Ensure an identity is invited or holds the desired role and suspension
//! - Release a membership by deleting the invite, removing or downgrading the user
//! - Import an existing membership by its `<tailnet>:<login_name>` identifier

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tailnet_directory::TailnetClient;
use tailnet_membership::{MembershipEngine, OperationContext};

mod commands;
mod config;
mod error;
mod logging;
mod output;

use config::CliConfig;
use error::CliResult;

/// Tailnet membership reconciliation
#[derive(Parser)]
#[command(name = "tailnet-membership")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, short = 'c', global = true, env = "TAILNET_CONFIG")]
    config: Option<PathBuf>,

    /// Give up after this many seconds (overrides operation_timeout_secs)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where an identity stands
    Resolve(commands::resolve::ResolveArgs),

    /// Invite an identity or bring its user to the desired role and suspension
    Ensure(commands::ensure::EnsureArgs),

    /// Delete the invite, or remove or downgrade the user
    Release(commands::release::ReleaseArgs),

    /// Resolve an existing membership from its identifier
    Import(commands::import::ImportArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.operation_timeout_secs = timeout;
    }
    config.validate()?;
    logging::init_logging(&config.logging)?;

    tracing::debug!(
        base_url = %config.directory.base_url,
        tailnet = config.directory.scope(),
        timeout_secs = config.operation_timeout_secs,
        "Configuration loaded"
    );

    let client = TailnetClient::new(&config.directory)?;
    let engine = MembershipEngine::new(Arc::new(client));

    let ctx = OperationContext::background()
        .with_timeout(Duration::from_secs(config.operation_timeout_secs));

    // Ctrl-C stops the operation between or during remote calls.
    let on_signal = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &engine, &ctx).await,
        Commands::Ensure(args) => commands::ensure::execute(args, &engine, &ctx).await,
        Commands::Release(args) => commands::release::execute(args, &engine, &ctx).await,
        Commands::Import(args) => commands::import::execute(args, &engine, &ctx).await,
    }
}
