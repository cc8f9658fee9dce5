//! `taskdown reconcile` - apply a document from disk.

use crate::backup::Backup;
use crate::commands::run_reconcile;
use crate::context::Context;
use crate::error::CliResult;
use clap::Args;
use std::path::PathBuf;
use taskdown_doc::{parse_document, render_snapshot};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Location of the source document
    pub file_path: PathBuf,
}

pub async fn execute(args: ReconcileArgs, ctx: &Context) -> CliResult<()> {
    // Parse before fetching: a malformed document must fail before anything
    // touches the network.
    let text = std::fs::read_to_string(&args.file_path)?;
    let new = parse_document(&text)?;

    let client = ctx.client()?;
    let old = ctx.fetch(&client).await?;

    Backup::new(ctx.paths.cache_dir.clone()).write(&render_snapshot(&old))?;
    run_reconcile(&client, &old, &new).await
}
