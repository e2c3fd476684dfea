//! Destroy command - deletes a session record.

use anyhow::Result;
use clap::Args;
use satchel_session::SessionStore;

use super::Context;

/// Arguments for the destroy command.
#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Session id
    pub id: String,
}

/// Run the destroy command.
pub fn run(args: DestroyArgs, ctx: &Context) -> Result<()> {
    ctx.open_store()?.destroy(&args.id)?;
    Ok(())
}
