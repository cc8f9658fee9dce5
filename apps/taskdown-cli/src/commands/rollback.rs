//! `taskdown rollback` - re-apply the most recent backup.

use crate::backup::Backup;
use crate::commands::run_reconcile;
use crate::context::Context;
use crate::error::{CliError, CliResult};
use clap::Args;
use taskdown_doc::parse_document;

#[derive(Args)]
pub struct RollbackArgs {}

pub async fn execute(_args: RollbackArgs, ctx: &Context) -> CliResult<()> {
    let backup = Backup::new(ctx.paths.cache_dir.clone());
    let Some(path) = backup.pop()? else {
        return Err(CliError::NoBackup);
    };

    let text = std::fs::read_to_string(&path)?;
    let new = parse_document(&text)?;

    let client = ctx.client()?;
    let old = ctx.fetch(&client).await?;

    // No backup write here: rolling back should not overwrite the history
    // being walked.
    run_reconcile(&client, &old, &new).await
}
