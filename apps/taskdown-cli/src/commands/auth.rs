//! `taskdown auth` - store API credentials for a profile.

use crate::config;
use crate::context::Context;
use crate::error::CliResult;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct AuthArgs {
    /// Location of the credentials JSON file to store
    pub credentials_file: PathBuf,
}

pub async fn execute(args: AuthArgs, ctx: &Context) -> CliResult<()> {
    let text = std::fs::read_to_string(&args.credentials_file)?;
    config::save_credentials(&ctx.paths, &text)?;
    println!("Stored credentials for profile '{}'.", ctx.user);
    Ok(())
}
