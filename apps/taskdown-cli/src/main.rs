//! taskdown - declarative Google Tasks management from a markdown document
//!
//! The CLI renders the remote task hierarchy as markdown, hands it to an
//! editor, and reconciles whatever comes back:
//! - `auth` stores API credentials for a profile
//! - `view` prints the current remote state
//! - `edit` opens the document in `$EDITOR` and applies the changes
//! - `reconcile` applies a document from disk
//! - `rollback` re-applies the most recent backup

use clap::{Parser, Subcommand};

mod backup;
mod commands;
mod config;
mod context;
mod editor;
mod error;
mod logging;

use context::Context;
use error::CliResult;

/// taskdown - Google Tasks as an editable markdown document
#[derive(Parser)]
#[command(name = "taskdown")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Profile whose credentials and backups are used
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Only include completed tasks finished after this date (YYYY-MM-DD).
    /// Defaults to one week ago.
    #[arg(long, global = true, value_name = "DATE")]
    completed_after: Option<String>,

    /// Only include completed tasks finished before this date (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    completed_before: Option<String>,

    /// Restrict fetches to one bucket: pending (needsAction) or completed
    #[arg(long, global = true, value_name = "STATUS")]
    status: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store API credentials for the selected profile
    Auth(commands::auth::AuthArgs),

    /// Print the current remote state as a markdown document
    View(commands::view::ViewArgs),

    /// Edit the document in an editor and reconcile the result
    Edit(commands::edit::EditArgs),

    /// Reconcile remote state against a document on disk
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Re-apply the most recent backup
    Rollback(commands::rollback::RollbackArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = match Context::from_globals(
        &cli.user,
        cli.completed_after.as_deref(),
        cli.completed_before.as_deref(),
        cli.status.as_deref(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    };

    logging::init(&ctx.paths);

    match run(cli.command, &ctx).await {
        Ok(()) => {}
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(command: Commands, ctx: &Context) -> CliResult<()> {
    match command {
        Commands::Auth(args) => commands::auth::execute(args, ctx).await,
        Commands::View(args) => commands::view::execute(args, ctx).await,
        Commands::Edit(args) => commands::edit::execute(args, ctx).await,
        Commands::Reconcile(args) => commands::reconcile::execute(args, ctx).await,
        Commands::Rollback(args) => commands::rollback::execute(args, ctx).await,
    }
}
