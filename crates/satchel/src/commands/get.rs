//! Get command - prints a live session value.

use anyhow::{Result, bail};
use clap::Args;
use satchel_session::SessionStore;

use super::Context;

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Session id
    pub id: String,
}

/// Run the get command.
pub fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    match store.read(&args.id)? {
        Some(value) => {
            println!("{}", String::from_utf8_lossy(&value));
            Ok(())
        }
        None => bail!("not found"),
    }
}
