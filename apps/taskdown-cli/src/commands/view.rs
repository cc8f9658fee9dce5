//! `taskdown view` - print the remote state as a markdown document.

use crate::context::Context;
use crate::error::CliResult;
use clap::Args;
use taskdown_doc::render_snapshot;

#[derive(Args)]
pub struct ViewArgs {}

pub async fn execute(_args: ViewArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.client()?;
    let snapshot = ctx.fetch(&client).await?;
    print!("{}", render_snapshot(&snapshot));
    Ok(())
}
