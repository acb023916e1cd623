//! Shopguard CLI: inspect what a staff member may do in the admin dashboard.
//!
//! ```bash
//! shopguard check --actor act_42 --resource returns --resource orders --action update
//! shopguard routes --actor act_42 --file ./fixtures/permissions.json
//! shopguard inspect --actor act_42
//! ```
//!
//! Configuration comes from `shopguard.toml` and `SHOPGUARD_*` variables.
//! See `shopguard --help` for all commands and options.

mod commands;

use clap::{Parser, Subcommand};
use commands::SessionArgs;
use shopguard_core::logging::init_logging;
use shopguard_core::permissions::RouteDecision;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shopguard", about = "Dashboard permission inspection tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether the actor may perform an action
    ///
    /// Exits 0 on allow, 2 on deny and 1 on error.
    Check {
        #[command(flatten)]
        session: SessionArgs,

        /// Resource to check, repeat for "any of"
        #[arg(long = "resource", required = true)]
        resources: Vec<String>,

        /// Action to check, e.g. read or update
        #[arg(long)]
        action: String,
    },
    /// List the dashboard routes with the actor's decision for each
    Routes {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Print the actor's roles and grants
    Inspect {
        #[command(flatten)]
        session: SessionArgs,
    },
}

impl Commands {
    fn session(&self) -> &SessionArgs {
        match self {
            Commands::Check { session, .. }
            | Commands::Routes { session }
            | Commands::Inspect { session } => session,
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let config = commands::load_config(command.session())?;
    init_logging(&config.logging.to_logging_config()?)?;

    let mut out = std::io::stdout().lock();
    match command {
        Commands::Check { session, resources, action } => {
            match commands::check::run(&session, &config, &resources, &action, &mut out).await? {
                RouteDecision::Allow => Ok(ExitCode::SUCCESS),
                RouteDecision::Deny => Ok(ExitCode::from(2)),
            }
        }
        Commands::Routes { session } => {
            commands::routes::run(&session, &config, &mut out).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect { session } => {
            commands::inspect::run(&session, &config, &mut out).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
