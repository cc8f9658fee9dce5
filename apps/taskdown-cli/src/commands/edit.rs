//! `taskdown edit` - edit the document in an editor and reconcile.

use crate::backup::Backup;
use crate::commands::run_reconcile;
use crate::context::Context;
use crate::editor::Editor;
use crate::error::CliResult;
use clap::Args;
use taskdown_doc::{parse_document, render_snapshot};

#[derive(Args)]
pub struct EditArgs {
    /// Editor command; defaults to $VISUAL, then $EDITOR, then vim
    #[arg(long, default_value = "")]
    pub editor: String,
}

pub async fn execute(args: EditArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.client()?;
    let old = ctx.fetch(&client).await?;
    let old_text = render_snapshot(&old);

    let new_text = Editor::resolve(&args.editor).edit(&old_text)?;
    let new = parse_document(&new_text)?;

    Backup::new(ctx.paths.cache_dir.clone()).write(&old_text)?;
    run_reconcile(&client, &old, &new).await
}
